use hostdiag_core::api::{Capabilities, Task, TaskId};

pub fn linux_caps() -> Capabilities {
    Capabilities {
        os: "linux".to_string(),
        distro: "arch".to_string(),
        distro_id: "arch_linux".to_string(),
        desktop: String::new(),
        is_root: false,
        is_wayland: false,
    }
}

pub fn shell_task(id: u64, name: &str, category: &str, command: &str) -> Task {
    Task {
        id: TaskId(id),
        name: name.to_string(),
        command: command.to_string(),
        category: category.to_string(),
        ..Task::default()
    }
}
