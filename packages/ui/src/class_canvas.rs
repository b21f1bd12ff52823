//! Freeform canvas of draggable class boxes.
//!
//! Dragging starts on a card header. The canvas tracks the grabbed card and the
//! pointer's offset inside it, moves the card on every mouse move, and drops it
//! on mouse up or when the pointer leaves the canvas.

use dioxus::prelude::*;
use store::ClassBox;

use crate::class_card::ClassCard;

const CANVAS_CSS: Asset = asset!("/assets/styling/canvas.css");

#[derive(Clone, Copy, Debug, PartialEq)]
struct Drag {
    index: usize,
    offset_x: f64,
    offset_y: f64,
}

/// Position of a dragged box for a pointer at `(pointer_x, pointer_y)`.
/// Boxes never leave the top-left edge of the canvas.
pub fn dragged_position(pointer_x: f64, pointer_y: f64, offset_x: f64, offset_y: f64) -> (f64, f64) {
    ((pointer_x - offset_x).max(0.0), (pointer_y - offset_y).max(0.0))
}

#[component]
pub fn ClassCanvas(classes: Signal<Vec<ClassBox>>) -> Element {
    let mut classes = classes;
    let mut drag = use_signal(|| Option::<Drag>::None);

    let snapshot = classes();
    let active = drag().map(|d| d.index);

    rsx! {
        document::Stylesheet { href: CANVAS_CSS }

        div {
            class: "class-canvas",
            onmousemove: move |evt: MouseEvent| {
                let Some(d) = drag() else {
                    return;
                };
                let pointer = evt.page_coordinates();
                let (x, y) = dragged_position(pointer.x, pointer.y, d.offset_x, d.offset_y);
                if let Some(class) = classes.write().get_mut(d.index) {
                    class.x = x;
                    class.y = y;
                }
            },
            onmouseup: move |_| drag.set(None),
            onmouseleave: move |_| drag.set(None),

            if snapshot.is_empty() {
                div { class: "class-canvas-empty", "No classes yet. Use \u{201c}Add class\u{201d} to start." }
            }

            for (index, class) in snapshot.into_iter().enumerate() {
                ClassCard {
                    key: "{index}",
                    class: class,
                    dragging: active == Some(index),
                    on_change: move |updated: ClassBox| {
                        if let Some(slot) = classes.write().get_mut(index) {
                            *slot = updated;
                        }
                    },
                    on_drag_start: move |(offset_x, offset_y): (f64, f64)| {
                        drag.set(Some(Drag { index, offset_x, offset_y }));
                    },
                    on_remove: move |_| {
                        let mut list = classes.write();
                        if index < list.len() {
                            list.remove(index);
                        }
                        drag.set(None);
                    },
                }
            }
        }
    }
}
