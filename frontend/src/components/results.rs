use super::super::Model;
use super::utils::{debounce, render_file_input, trigger_file_input};
use shared::DetectionResult;
use yew::prelude::*;

pub fn render_results(result: &DetectionResult, ctx: &Context<Model>) -> Html {
    let confidence = result.confidence_percent();

    html! {
        <div class="results-container">
            <div class="result-summary">
                <h2>{"Results"}</h2>
                <ul class="result-list">
                    <li><b>{"Decision: "}</b>{ result.ripeness() }</li>
                    <li><b>{"Number of tomatoes detected: "}</b>{ result.count() }</li>
                    <li>
                        <b>{"Overall Confidence: "}</b>
                        <div class="meter">
                            <div class="meter-fill" style={format!("width: {}%", confidence)}></div>
                        </div>
                        <span class="meter-value">{ format!("{:.1}%", confidence) }</span>
                    </li>
                </ul>

                <p class="retry-prompt">{"Want to try one more?"}</p>
                { render_file_input(ctx) }
                <button class="cta-button" onclick={debounce(300, trigger_file_input)}>
                    <i class="fa-solid fa-upload"></i>{" Upload Image"}
                </button>
            </div>

            <div class="result-image">
                <img
                    src={result.annotated_image().data_uri()}
                    alt="Detection Output"
                    style="border-radius: 10px; max-width: 400px; width: 80%; object-fit: contain;"
                />
            </div>
        </div>
    }
}
