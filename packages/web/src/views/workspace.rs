//! The diagram workspace: project panel on the left, canvas on the right,
//! activity log along the bottom.

use dioxus::prelude::*;
use store::{ClassBox, ProjectId, ProjectInfo, DEFAULT_POSITION};
use ui::activity_log::ActivityLog;
use ui::{log_activity, use_activity_log, use_auth, ClassCanvas, LogLevel, ProjectPanel, StatusBar};

use crate::Route;

#[component]
pub fn Workspace() -> Element {
    let auth = use_auth();
    let nav = use_navigator();
    let log = use_activity_log();
    let mut classes = use_signal(Vec::<ClassBox>::new);
    let projects = use_signal(Vec::<ProjectInfo>::new);
    let current = use_signal(|| Option::<ProjectInfo>::None);

    // Redirect to login once we know nobody is signed in
    if !auth().loading && auth().user.is_none() {
        nav.replace(Route::Login {});
    }

    let _ = use_resource(move || async move {
        if auth().user.is_none() {
            return;
        }
        refresh(projects, current, classes, log).await;
    });

    let on_create = move |name: String| {
        spawn(async move {
            let mut log = log;
            match api::create_project(name).await {
                Ok(_) => {
                    show_flash(log, LogLevel::Success).await;
                    refresh(projects, current, classes, log).await;
                }
                Err(e) => log_activity(&mut log, LogLevel::Error, &api::error_message(&e)),
            }
        });
    };

    let on_select = move |id: ProjectId| {
        spawn(async move {
            let mut log = log;
            match api::select_project(id).await {
                Ok(_) => {
                    show_flash(log, LogLevel::Success).await;
                    refresh(projects, current, classes, log).await;
                }
                Err(e) => {
                    let message = selection_failure(pending_flash().await, &e);
                    log_activity(&mut log, LogLevel::Error, &message);
                }
            }
        });
    };

    let on_add_class = move |_| {
        classes
            .write()
            .push(ClassBox::at(DEFAULT_POSITION, DEFAULT_POSITION));
    };

    let on_list_classes = move |_| {
        let mut log = log;
        let snapshot = classes();
        if snapshot.is_empty() {
            log_activity(&mut log, LogLevel::Info, "No classes on the canvas.");
            return;
        }
        for class in &snapshot {
            tracing::info!(?class, "class on canvas");
            log_activity(&mut log, LogLevel::Info, &describe(class));
        }
    };

    let on_save = move |_| {
        spawn(async move {
            let mut log = log;
            match api::save_classes(classes()).await {
                Ok(message) => log_activity(&mut log, LogLevel::Success, &message),
                Err(e) => log_activity(&mut log, LogLevel::Error, &api::error_message(&e)),
            }
        });
    };

    let user_name = auth()
        .user
        .as_ref()
        .map(|u| u.display_name().to_string())
        .unwrap_or_default();

    rsx! {
        div {
            class: "workspace",
            ProjectPanel {
                user_name: user_name,
                projects: projects(),
                current: current(),
                on_create: on_create,
                on_select: on_select,
                on_add_class: on_add_class,
                on_list_classes: on_list_classes,
                on_save: on_save,
            }
            ClassCanvas { classes: classes }
        }
        StatusBar {}
    }
}

/// Reload the project list, the active project and its classes.
async fn refresh(
    mut projects: Signal<Vec<ProjectInfo>>,
    mut current: Signal<Option<ProjectInfo>>,
    mut classes: Signal<Vec<ClassBox>>,
    mut log: Signal<ActivityLog>,
) {
    match api::list_projects().await {
        Ok(list) => projects.set(list),
        Err(e) => log_activity(&mut log, LogLevel::Error, &api::error_message(&e)),
    }

    let active = match api::current_project().await {
        Ok(active) => active,
        Err(e) => {
            log_activity(&mut log, LogLevel::Error, &api::error_message(&e));
            None
        }
    };
    let has_project = active.is_some();
    current.set(active);

    if !has_project {
        classes.set(Vec::new());
        return;
    }
    match api::load_classes().await {
        Ok(loaded) => classes.set(loaded),
        Err(e) => log_activity(
            &mut log,
            LogLevel::Error,
            &format!("Error loading classes: {}", api::error_message(&e)),
        ),
    }
}

async fn show_flash(mut log: Signal<ActivityLog>, level: LogLevel) {
    if let Some(message) = pending_flash().await {
        log_activity(&mut log, level, &message);
    }
}

async fn pending_flash() -> Option<String> {
    match api::take_flash().await {
        Ok(flash) => flash,
        Err(e) => {
            tracing::warn!("Failed to read flash message: {}", e);
            None
        }
    }
}

/// An ownership failure leaves its own message in the flash. Anything else
/// (expired session, storage) is reported from the error itself.
fn selection_failure(flash: Option<String>, error: &ServerFnError) -> String {
    flash.unwrap_or_else(|| api::error_message(error))
}

fn describe(class: &ClassBox) -> String {
    format!(
        "{} at ({}, {}): properties [{}], methods [{}]",
        class.class_name,
        class.x,
        class.y,
        class.properties.join(", "),
        class.methods.join(", ")
    )
}
