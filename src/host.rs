//! Bridge to the page (or window) hosting the scene.
//!
//! Everything the scene reads from or writes to its surroundings goes
//! through [`HostPage`]: overlay flags, the loading bar, the selection
//! callback and the pointer glyph. Camera commands flow the other way
//! through a small thread-local queue that the event loop drains each frame.

use std::{cell::RefCell, collections::VecDeque};

use crate::config::ProjectId;

pub trait HostPage {
    /// True while any detail panel covers the scene. Hover and clicks are ignored then.
    fn overlay_active(&self) -> bool;
    fn set_progress(&mut self, percent: u32);
    fn loading_complete(&mut self);
    fn project_selected(&mut self, project: ProjectId);
    fn set_hovering(&mut self, hovering: bool);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraCommand {
    Reset,
    Overview,
}

thread_local! {
    static COMMANDS: RefCell<VecDeque<CameraCommand>> = const { RefCell::new(VecDeque::new()) };
}

pub fn push_command(command: CameraCommand) {
    COMMANDS.with(|queue| queue.borrow_mut().push_back(command));
}

/// Takes every queued command, oldest first.
pub fn drain_commands() -> Vec<CameraCommand> {
    COMMANDS.with(|queue| queue.borrow_mut().drain(..).collect())
}

/// Page hook: fly back to the default view.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(js_name = resetCamera)]
pub fn reset_camera() {
    push_command(CameraCommand::Reset);
}

/// Page hook: top-down view of every project.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(js_name = viewAllProjects)]
pub fn view_all_projects() {
    push_command(CameraCommand::Overview);
}

/// Desktop host: no overlays, effects are logged and the cursor is set on the window.
#[derive(Debug, Default)]
pub struct NativeHost {
    window: Option<std::sync::Arc<winit::window::Window>>,
}

impl NativeHost {
    pub fn new(window: Option<std::sync::Arc<winit::window::Window>>) -> Self {
        Self { window }
    }
}

impl HostPage for NativeHost {
    fn overlay_active(&self) -> bool {
        false
    }

    fn set_progress(&mut self, percent: u32) {
        log::info!("Loading progress: {}%", percent);
    }

    fn loading_complete(&mut self) {
        log::info!("All models loaded");
    }

    fn project_selected(&mut self, project: ProjectId) {
        log::info!("Project {} selected", project);
    }

    fn set_hovering(&mut self, hovering: bool) {
        if let Some(window) = &self.window {
            let icon = if hovering {
                winit::window::CursorIcon::Pointer
            } else {
                winit::window::CursorIcon::Default
            };
            window.set_cursor(icon);
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebHost;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::{JsCast, prelude::*};

    use super::HostPage;
    use crate::config::ProjectId;

    const OVERLAY_IDS: [&str; 3] = ["project-info", "about-section", "contact-section"];

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = window, js_name = showProject, catch)]
        fn show_project(id: u32) -> Result<(), JsValue>;
    }

    /// Browser host backed by the landing page DOM.
    #[derive(Debug, Default)]
    pub struct WebHost;

    impl WebHost {
        pub fn new() -> Self {
            Self
        }

        fn document() -> Option<web_sys::Document> {
            web_sys::window().and_then(|window| window.document())
        }
    }

    impl HostPage for WebHost {
        fn overlay_active(&self) -> bool {
            let Some(document) = Self::document() else {
                return false;
            };
            OVERLAY_IDS.iter().any(|id| {
                document
                    .get_element_by_id(id)
                    .is_some_and(|element| element.class_list().contains("active"))
            })
        }

        fn set_progress(&mut self, percent: u32) {
            let bar = Self::document()
                .and_then(|document| document.get_element_by_id("progress"))
                .and_then(|element| element.dyn_into::<web_sys::HtmlElement>().ok());
            match bar {
                Some(bar) => {
                    if let Err(e) = bar.style().set_property("width", &format!("{percent}%")) {
                        log::warn!("Could not update the progress bar: {:?}", e);
                    }
                }
                None => log::debug!("No #progress element, skipping progress {}%", percent),
            }
        }

        fn loading_complete(&mut self) {
            let loading = Self::document().and_then(|document| document.query_selector(".loading").ok().flatten());
            match loading {
                Some(element) => {
                    if let Err(e) = element.class_list().add_1("hidden") {
                        log::warn!("Could not hide the loading indicator: {:?}", e);
                    }
                }
                None => log::debug!("No .loading element to hide"),
            }
        }

        fn project_selected(&mut self, project: ProjectId) {
            if let Err(e) = show_project(project) {
                log::error!("showProject hook failed or is missing: {:?}", e);
            }
        }

        fn set_hovering(&mut self, hovering: bool) {
            let Some(body) = Self::document().and_then(|document| document.body()) else {
                return;
            };
            let cursor = if hovering { "pointer" } else { "auto" };
            if let Err(e) = body.style().set_property("cursor", cursor) {
                log::warn!("Could not set the cursor: {:?}", e);
            }
        }
    }
}
