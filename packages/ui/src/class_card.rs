use dioxus::prelude::*;
use dioxus_free_icons::icons::fa_solid_icons::FaXmark;
use dioxus_free_icons::Icon;
use store::ClassBox;

/// Render members one per line for editing.
pub fn members_to_text(members: &[String]) -> String {
    members.join("\n")
}

/// Split edited text back into members, one per line.
/// Blank lines are kept, so typing a newline does not move the cursor and a
/// blank entry round-trips through a save.
pub fn text_to_members(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

/// One class box on the canvas.
///
/// `on_drag_start` receives the pointer's offset from the box origin, in page
/// coordinates, so the canvas can keep that offset while dragging.
#[component]
pub fn ClassCard(
    class: ClassBox,
    dragging: bool,
    on_change: EventHandler<ClassBox>,
    on_drag_start: EventHandler<(f64, f64)>,
    on_remove: EventHandler<()>,
) -> Element {
    let (x, y) = (class.x, class.y);
    let card_class = if dragging { "class-card dragging" } else { "class-card" };
    let properties = members_to_text(&class.properties);
    let methods = members_to_text(&class.methods);

    let name_class = class.clone();
    let props_class = class.clone();
    let methods_class = class.clone();

    rsx! {
        article {
            class: card_class,
            style: "left: {x}px; top: {y}px;",

            header {
                class: "class-card-header",
                onmousedown: move |evt: MouseEvent| {
                    evt.prevent_default();
                    let pointer = evt.page_coordinates();
                    on_drag_start.call((pointer.x - x, pointer.y - y));
                },
                input {
                    class: "class-card-name",
                    r#type: "text",
                    placeholder: "Class name",
                    value: "{class.class_name}",
                    onmousedown: move |evt: MouseEvent| evt.stop_propagation(),
                    oninput: move |evt: FormEvent| {
                        on_change.call(ClassBox {
                            class_name: evt.value(),
                            ..name_class.clone()
                        });
                    },
                }
                button {
                    class: "class-card-remove",
                    title: "Remove class",
                    onmousedown: move |evt: MouseEvent| evt.stop_propagation(),
                    onclick: move |_| on_remove.call(()),
                    Icon { width: 12, height: 12, icon: FaXmark }
                }
            }

            section {
                class: "class-card-section",
                p { "Properties" }
                textarea {
                    placeholder: "One property per line",
                    value: "{properties}",
                    oninput: move |evt: FormEvent| {
                        on_change.call(ClassBox {
                            properties: text_to_members(&evt.value()),
                            ..props_class.clone()
                        });
                    },
                }
            }

            section {
                class: "class-card-section",
                p { "Methods" }
                textarea {
                    placeholder: "One method per line",
                    value: "{methods}",
                    oninput: move |evt: FormEvent| {
                        on_change.call(ClassBox {
                            methods: text_to_members(&evt.value()),
                            ..methods_class.clone()
                        });
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_text_keeps_order() {
        let members = vec!["id: i64".to_string(), "name: String".to_string()];
        let text = members_to_text(&members);
        assert_eq!(text, "id: i64\nname: String");
        assert_eq!(text_to_members(&text), members);
    }

    #[test]
    fn test_trailing_newline_survives_editing() {
        let members = text_to_members("save()\n");
        assert_eq!(members, vec!["save()".to_string(), String::new()]);
        assert_eq!(members_to_text(&members), "save()\n");
    }

    #[test]
    fn test_empty_text_has_no_members() {
        assert!(text_to_members("").is_empty());
        assert_eq!(text_to_members("a\r\nb"), vec!["a".to_string(), "b".to_string()]);
    }
}
