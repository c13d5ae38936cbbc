use gloo_timers::callback::Interval;
use js_sys::Date;
use shared::splash::{TICK_MS, progress_at, should_dismiss};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct LoadingScreenProps {
    /// Set once the workflow controller can accept uploads.
    pub ready: bool,
    pub on_finished: Callback<()>,
}

#[function_component(LoadingScreen)]
pub fn loading_screen(props: &LoadingScreenProps) -> Html {
    let progress = use_state(|| 0u8);

    {
        let progress = progress.clone();
        use_effect_with((), move |_| {
            let started = Date::now();
            let interval = Interval::new(TICK_MS, move || {
                progress.set(progress_at(Date::now() - started));
            });
            move || drop(interval)
        });
    }

    {
        let on_finished = props.on_finished.clone();
        use_effect_with((*progress, props.ready), move |(progress, ready)| {
            if should_dismiss(*progress, *ready) {
                on_finished.emit(());
            }
        });
    }

    html! {
        <div class="loading-screen" style="background-color: #6B8E23;">
            <div class="progress-bar" style={format!("width: {}%", *progress)}></div>
            <p class="count">{ format!("{}%", *progress) }</p>
        </div>
    }
}
