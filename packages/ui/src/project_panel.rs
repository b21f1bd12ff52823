use dioxus::prelude::*;
use dioxus_free_icons::icons::fa_solid_icons::{FaFloppyDisk, FaFolderOpen, FaList, FaPlus};
use dioxus_free_icons::Icon;
use store::{ProjectId, ProjectInfo};

use crate::auth::LogoutButton;

const PANEL_CSS: Asset = asset!("/assets/styling/project_panel.css");

/// Left-hand panel: project creation and selection plus the diagram actions.
#[component]
pub fn ProjectPanel(
    user_name: String,
    projects: Vec<ProjectInfo>,
    current: Option<ProjectInfo>,
    on_create: EventHandler<String>,
    on_select: EventHandler<ProjectId>,
    on_add_class: EventHandler<()>,
    on_list_classes: EventHandler<()>,
    on_save: EventHandler<()>,
) -> Element {
    let mut new_name = use_signal(String::new);
    let current_id = current.as_ref().map(|p| p.id);
    let mut selected = use_signal(move || current_id.map(|id| id.0.to_string()).unwrap_or_default());

    // Follow the server's choice after a create or select.
    use_effect(use_reactive!(|current_id| {
        selected.set(current_id.map(|id| id.0.to_string()).unwrap_or_default());
    }));

    let handle_create = move |evt: FormEvent| {
        evt.prevent_default();
        let name = new_name().trim().to_string();
        if name.is_empty() {
            return;
        }
        new_name.set(String::new());
        on_create.call(name);
    };

    let handle_select = move |evt: FormEvent| {
        evt.prevent_default();
        match selected().parse::<i64>() {
            Ok(id) => on_select.call(ProjectId(id)),
            Err(_) => tracing::debug!("no project chosen"),
        }
    };

    let has_project = current.is_some();
    let heading = current
        .as_ref()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "No project selected".to_string());

    rsx! {
        document::Stylesheet { href: PANEL_CSS }

        aside {
            class: "project-panel",

            div {
                class: "project-panel-user",
                span { "Signed in as " strong { "{user_name}" } }
            }

            h2 { class: "project-panel-heading", "{heading}" }

            form {
                class: "project-panel-form",
                onsubmit: handle_create,
                label { r#for: "new-project-name", "New project" }
                input {
                    id: "new-project-name",
                    r#type: "text",
                    placeholder: "Project name",
                    required: true,
                    value: new_name(),
                    oninput: move |evt: FormEvent| new_name.set(evt.value()),
                }
                button {
                    r#type: "submit",
                    Icon { width: 12, height: 12, icon: FaPlus }
                    " Create"
                }
            }

            if !projects.is_empty() {
                form {
                    class: "project-panel-form",
                    onsubmit: handle_select,
                    label { r#for: "project-select", "Open project" }
                    select {
                        id: "project-select",
                        value: selected(),
                        onchange: move |evt: FormEvent| selected.set(evt.value()),
                        option { value: "", disabled: true, "Choose a project" }
                        for project in &projects {
                            option {
                                key: "{project.id.0}",
                                value: "{project.id.0}",
                                "{project.name}"
                            }
                        }
                    }
                    button {
                        r#type: "submit",
                        Icon { width: 12, height: 12, icon: FaFolderOpen }
                        " Open"
                    }
                }
            }

            nav {
                class: "project-panel-actions",
                button {
                    disabled: !has_project,
                    onclick: move |_| on_add_class.call(()),
                    Icon { width: 12, height: 12, icon: FaPlus }
                    " Add class"
                }
                button {
                    disabled: !has_project,
                    onclick: move |_| on_list_classes.call(()),
                    Icon { width: 12, height: 12, icon: FaList }
                    " List classes"
                }
                button {
                    class: "primary",
                    disabled: !has_project,
                    onclick: move |_| on_save.call(()),
                    Icon { width: 12, height: 12, icon: FaFloppyDisk }
                    " Save classes"
                }
                LogoutButton { class: "logout" }
            }
        }
    }
}
