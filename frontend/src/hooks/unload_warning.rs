use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{window, BeforeUnloadEvent, Window};
use yew::prelude::*;
use yew_hooks::use_unmount;

pub const UNLOAD_MESSAGE: &str = "You have unsaved changes. Leave anyway?";

/// A registered `beforeunload` handler; removed again on drop.
pub struct BeforeUnloadListener {
    window: Window,
    callback: Closure<dyn FnMut(BeforeUnloadEvent)>,
}

impl BeforeUnloadListener {
    pub fn attach(message: &'static str) -> Option<Self> {
        let window = window()?;
        let callback = Closure::wrap(Box::new(move |event: BeforeUnloadEvent| {
            event.prevent_default();
            // Most browsers show their own text instead of this one.
            event.set_return_value(message);
        }) as Box<dyn FnMut(BeforeUnloadEvent)>);

        window
            .add_event_listener_with_callback("beforeunload", callback.as_ref().unchecked_ref())
            .ok()?;
        Some(Self { window, callback })
    }
}

impl Drop for BeforeUnloadListener {
    fn drop(&mut self) {
        let _ = self.window.remove_event_listener_with_callback(
            "beforeunload",
            self.callback.as_ref().unchecked_ref(),
        );
    }
}

/// Holds at most one listener. Switching the flag on attaches, switching
/// it off drops the held one.
pub struct ListenerSlot<L> {
    active: Option<L>,
}

impl<L> Default for ListenerSlot<L> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<L> ListenerSlot<L> {
    pub fn sync(&mut self, should_warn: bool, attach: impl FnOnce() -> Option<L>) {
        if !should_warn {
            self.clear();
        } else if self.active.is_none() {
            self.active = attach();
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

/// Asks the browser to confirm leaving the page while `should_warn` holds.
#[hook]
pub fn use_unload_warning(should_warn: bool) {
    let slot = use_mut_ref(ListenerSlot::<BeforeUnloadListener>::default);

    {
        let slot = slot.clone();
        use_effect_with_deps(
            move |should_warn| {
                slot.borrow_mut()
                    .sync(*should_warn, || BeforeUnloadListener::attach(UNLOAD_MESSAGE));
                || ()
            },
            should_warn,
        );
    }

    use_unmount(move || slot.borrow_mut().clear());
}
