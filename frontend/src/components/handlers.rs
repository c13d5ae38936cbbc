use super::super::{Model, Msg, Session};
use crate::api::uploaded_file;
use gloo_file::File as GlooFile;
use shared::{ClientConfig, Completion};
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::DragEvent;
use yew::prelude::*;

pub fn handle_config_loaded(model: &mut Model, config: ClientConfig) -> bool {
    log::info!(
        "Inference endpoint {} (field `{}`, timeout {:?} ms)",
        config.endpoint,
        config.upload_field,
        config.timeout_ms
    );
    model.session = Some(Session::new(&config));
    true
}

pub fn handle_file_selected(model: &mut Model, ctx: &Context<Model>, file: GlooFile) -> bool {
    let Some(session) = model.session.as_mut() else {
        log::warn!("Ignoring {} selected before the app was ready", file.name());
        return false;
    };

    let ticket = session.controller.submit(uploaded_file(file));
    log::info!(
        "Uploading {} ({}) as submission {}",
        ticket.file().name(),
        ticket.file().id(),
        ticket.id()
    );

    let transport = Rc::clone(&session.transport);
    let link = ctx.link().clone();
    spawn_local(async move {
        let completion = ticket.exchange(transport.as_ref()).await;
        link.send_message(Msg::UploadFinished(completion));
    });

    true
}

pub fn handle_upload_finished(model: &mut Model, completion: Completion) -> bool {
    let Some(session) = model.session.as_mut() else {
        return false;
    };

    let id = completion.id();
    let applied = session.controller.complete(completion);
    if !applied {
        log::info!("Dropped stale result for submission {}", id);
    }
    applied
}

pub fn handle_acknowledge(model: &mut Model) -> bool {
    model
        .session
        .as_mut()
        .is_some_and(|session| session.controller.acknowledge())
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    let first = event
        .data_transfer()
        .and_then(|data_transfer| data_transfer.files())
        .and_then(|file_list| file_list.item(0));

    if let Some(file) = first {
        ctx.link().send_message(Msg::FileSelected(GlooFile::from(file)));
    }

    true
}
