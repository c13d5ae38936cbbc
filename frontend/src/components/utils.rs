use super::super::{Model, Msg};
use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use shared::Failure;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;
use yew::prelude::*;

const FILE_INPUT_ID: &str = "file-input";

// Debounce function to limit button events
pub fn debounce<F>(duration: i32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));
    let timeout_clone = Rc::clone(&timeout);

    Callback::from(move |_| {
        let mut timeout_ref = timeout_clone.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        let new_timeout = Timeout::new(duration as u32, move || {
            inner_callback();
        });

        *timeout_ref = Some(new_timeout);
    })
}

/// Opens the browser's file picker through the hidden input.
pub fn trigger_file_input() {
    let input = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(FILE_INPUT_ID));

    if let Some(input) = input {
        if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
            html_input.click();
        }
    }
}

pub fn render_file_input(ctx: &Context<Model>) -> Html {
    let handle_change = ctx.link().batch_callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let selected = input
            .files()
            .and_then(|files| files.item(0))
            .map(GlooFile::from);

        input.set_value("");
        selected.map(Msg::FileSelected)
    });

    html! {
        <input
            type="file"
            id={FILE_INPUT_ID}
            accept="image/*"
            style="display: none;"
            onchange={handle_change}
        />
    }
}

pub fn render_error_message(failure: &Failure, ctx: &Context<Model>) -> Html {
    html! {
        <div class="error-message" title={failure.kind.to_string()}>
            <i class="fa-solid fa-circle-exclamation"></i>
            <p>{ format!("Upload failed: {}", failure.message) }</p>
            <button class="dismiss-btn" onclick={ctx.link().callback(|_| Msg::Acknowledge)}>
                {"Dismiss"}
            </button>
        </div>
    }
}
