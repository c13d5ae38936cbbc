use yew::prelude::*;

const REPOSITORY_URL: &str = "https://github.com/vineet12344/kanjuku-tomato-AI";

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1 class="title-main">{"AI Tomato Ripeness Detector"}</h1>
            <a class="github-link" href={REPOSITORY_URL} target="_blank" rel="noopener noreferrer">
                <i class="fa-brands fa-github"></i>{" GitHub"}
            </a>
        </header>
    }
}
