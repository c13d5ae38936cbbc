use super::super::{Model, Msg};
use super::utils::{debounce, render_file_input, trigger_file_input};
use crate::api::BrowserImage;
use shared::UploadedFile;
use yew::prelude::*;

/// Processing view. Picking or dropping another image here supersedes the
/// upload in flight.
pub fn render_preview_area(file: &UploadedFile<BrowserImage>, ctx: &Context<Model>) -> Html {
    let handle_drag_over = Callback::from(|e: DragEvent| e.prevent_default());
    let handle_drop = ctx.link().callback(Msg::HandleDrop);

    html! {
        <div class="processing-view" ondragover={handle_drag_over} ondrop={handle_drop}>
            { render_file_input(ctx) }
            <img
                id="actual-image-preview"
                class="preview-image"
                src={file.source().preview_url()}
                alt={file.name().to_string()}
                style="width: 20%; object-fit: contain;"
            />
            <h2><i class="fa-solid fa-spinner fa-spin"></i>{" Detecting Ripeness..."}</h2>
            <p>{"This may take a moment."}</p>
            <button class="secondary-button" onclick={debounce(300, trigger_file_input)}>
                <i class="fa-solid fa-rotate"></i>
                {" Choose a different image"}
            </button>
        </div>
    }
}
