use super::super::Model;
use super::super::Msg;
use super::utils::{debounce, render_file_input, trigger_file_input};
use web_sys::DragEvent;
use yew::prelude::*;

pub fn render_upload_section(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);

    html! {
        <div class="hero-section">
            { render_file_input(ctx) }

            <div
                id="drop-zone"
                class={classes!("left-column", "upload-area", model.is_dragging.then_some("drag-over"))}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
                onclick={debounce(300, trigger_file_input)}
            >
                {
                    if model.is_dragging {
                        html! { <p>{"Drop the image here..."}</p> }
                    } else {
                        html! {
                            <button id="upload-button" class="cta-button">
                                <i class="fa-solid fa-upload"></i>
                                <p>{"Upload Image"}</p>
                            </button>
                        }
                    }
                }
                <p class="file-types">{"Supported formats: JPG, PNG, WEBP, GIF"}</p>
            </div>
        </div>
    }
}
