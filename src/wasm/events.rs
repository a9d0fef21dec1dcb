use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::{Closure, WasmClosure};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{console, Document, Event, EventTarget, MouseEvent, TouchEvent, Window};

use super::render::App;

/// Register `closure` for `kind` on `target` for the lifetime of the page.
fn listen<T>(target: &EventTarget, kind: &str, closure: Closure<T>) -> Result<(), JsValue>
where
    T: ?Sized + WasmClosure,
{
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Pointer and touch tracking. Coordinates are viewport-relative, which is
/// also canvas space since the canvas is viewport-fixed.
pub(super) fn on_pointer(document: &Document, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let target: &EventTarget = document.as_ref();

    let mouse_move = {
        let app = app.clone();
        Closure::wrap(Box::new(move |e: MouseEvent| {
            app.borrow_mut()
                .background
                .pointer_move(e.client_x() as f64, e.client_y() as f64);
        }) as Box<dyn FnMut(MouseEvent)>)
    };
    listen(target, "mousemove", mouse_move)?;

    let touch_move = {
        let app = app.clone();
        Closure::wrap(Box::new(move |e: TouchEvent| {
            if let Some(touch) = e.touches().get(0) {
                app.borrow_mut()
                    .background
                    .pointer_move(touch.client_x() as f64, touch.client_y() as f64);
            }
        }) as Box<dyn FnMut(TouchEvent)>)
    };
    listen(target, "touchmove", touch_move)?;

    for kind in ["mouseleave", "touchend"] {
        let app = app.clone();
        let leave = Closure::wrap(Box::new(move |_: Event| {
            app.borrow_mut().background.pointer_leave();
        }) as Box<dyn FnMut(Event)>);
        listen(target, kind, leave)?;
    }

    Ok(())
}

/// Hidden tabs keep the frame loop alive but skip all field and draw work.
pub(super) fn on_visibility(document: &Document, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let doc = document.clone();
    let changed = Closure::wrap(Box::new(move |_: Event| {
        app.borrow_mut().background.set_visible(!doc.hidden());
    }) as Box<dyn FnMut(Event)>);
    listen(document.as_ref(), "visibilitychange", changed)
}

/// Debounced resize: only the last event of a burst, after a quiet period,
/// rebuilds the grid and redraws.
pub(super) fn on_resize(window: &Window, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let delay = app.borrow().background.config().resize_debounce_ms;
    let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

    let fire = {
        let pending = pending.clone();
        Closure::wrap(Box::new(move || {
            pending.set(None);
            if let Err(err) = app.borrow_mut().relayout() {
                console::error_1(&err);
            }
        }) as Box<dyn FnMut()>)
    };

    let win = window.clone();
    let resized = Closure::wrap(Box::new(move |_: Event| {
        if let Some(handle) = pending.take() {
            win.clear_timeout_with_handle(handle);
        }
        match win.set_timeout_with_callback_and_timeout_and_arguments_0(
            fire.as_ref().unchecked_ref(),
            delay,
        ) {
            Ok(handle) => pending.set(Some(handle)),
            Err(err) => console::error_1(&err),
        }
    }) as Box<dyn FnMut(Event)>);
    listen(window.as_ref(), "resize", resized)
}
