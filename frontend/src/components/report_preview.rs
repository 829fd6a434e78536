use yew::prelude::*;
use gloo_timers::callback::Timeout;

const SECTIONS: &[(&str, &str)] = &[
    ("Market snapshot", "Demand, competitors and pricing at a glance"),
    ("Cost breakdown", "Where the money goes, line by line"),
    ("Risk review", "What could go wrong and how likely it is"),
    ("Recommendation", "A clear next step you can act on"),
];

fn stage_delay(stage: usize) -> u32 {
    match stage {
        0 => 300,
        s if s < SECTIONS.len() => 1200,
        _ => 4000, // hold the finished report before looping
    }
}

fn next_stage(stage: usize) -> usize {
    if stage >= SECTIONS.len() {
        0
    } else {
        stage + 1
    }
}

/// Landing page mock of a report filling in section by section.
#[function_component(ReportPreview)]
pub fn report_preview() -> Html {
    let stage = use_state(|| 0usize);

    {
        let current = *stage;
        let stage_setter = stage.setter();
        use_effect_with_deps(
            move |current| {
                let next = next_stage(*current);
                let timeout = Timeout::new(stage_delay(*current), move || {
                    stage_setter.set(next);
                });
                move || drop(timeout)
            },
            current,
        );
    }

    html! {
        <div class="report-preview">
            <div class="report-preview-header">
                <span class="report-preview-dot"></span>
                {"Your report"}
            </div>
            { for SECTIONS.iter().enumerate().map(|(i, (title, blurb))| {
                let visible = i < *stage;
                html! {
                    <div key={*title} class={classes!("report-preview-section", visible.then(|| "fade-in"))}
                        style={if visible { "opacity: 1;" } else { "opacity: 0;" }}>
                        <h4>{ *title }</h4>
                        <p>{ *blurb }</p>
                    </div>
                }
            }) }
        </div>
    }
}
