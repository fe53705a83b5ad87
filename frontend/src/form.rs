use shared::FormInput;
use zoon::*;

/// Live text of the analysis form, one `Mutable` per field.
#[derive(Clone)]
pub struct FormFields {
    pub genes: Mutable<String>,
    pub metric: Mutable<String>,
    pub gene_sets: Mutable<String>,
    pub weight: Mutable<String>,
    pub min_size: Mutable<String>,
    pub max_size: Mutable<String>,
    pub nperm: Mutable<String>,
    pub seed: Mutable<String>,
}

impl FormFields {
    pub fn new(defaults: &FormInput) -> Self {
        Self {
            genes: Mutable::new(defaults.genes.clone()),
            metric: Mutable::new(defaults.metric.clone()),
            gene_sets: Mutable::new(defaults.gene_sets.clone()),
            weight: Mutable::new(defaults.weight.clone()),
            min_size: Mutable::new(defaults.min_size.clone()),
            max_size: Mutable::new(defaults.max_size.clone()),
            nperm: Mutable::new(defaults.nperm.clone()),
            seed: Mutable::new(defaults.seed.clone()),
        }
    }

    /// Field text at the moment of submission.
    pub fn snapshot(&self) -> FormInput {
        FormInput {
            genes: self.genes.get_cloned(),
            metric: self.metric.get_cloned(),
            gene_sets: self.gene_sets.get_cloned(),
            weight: self.weight.get_cloned(),
            min_size: self.min_size.get_cloned(),
            max_size: self.max_size.get_cloned(),
            nperm: self.nperm.get_cloned(),
            seed: self.seed.get_cloned(),
        }
    }
}

fn field(label: &'static str, placeholder: &'static str, text: &Mutable<String>) -> impl Element {
    Column::new()
        .s(Width::fill())
        .s(Gap::new().y(4))
        .item(El::new().s(Font::new().size(13).weight(FontWeight::SemiBold)).child(Text::new(label)))
        .item(
            TextInput::new()
                .s(Width::fill())
                .s(Padding::new().x(8).y(6))
                .s(Borders::all(Border::new().color("rgb(190, 190, 190)")))
                .s(RoundedCorners::all(4))
                .label_hidden(label)
                .placeholder(Placeholder::new(placeholder))
                .text_signal(text.signal_cloned())
                .on_change({
                    let text = text.clone();
                    move |new_text| text.set_neq(new_text)
                }),
        )
}

/// Wraps `on_run` so it only fires while runs are enabled.
pub fn gated(run_enabled: Mutable<bool>, mut on_run: impl FnMut()) -> impl FnMut() {
    move || {
        if run_enabled.get() {
            on_run();
        }
    }
}

/// A native `<button>` so that `disabled` takes it out of focus, clicks and
/// keyboard activation while no run can be accepted.
fn run_button(run_enabled: &Mutable<bool>, on_run: impl FnMut() + 'static) -> impl Element {
    let mut on_run = gated(run_enabled.clone(), on_run);
    RawHtmlEl::new("button")
        .attr("type", "button")
        .attr("data-testid", "run-analysis")
        .attr_signal("disabled", run_enabled.signal().map_false(|| "true"))
        .style("padding", "8px 16px")
        .style("border", "none")
        .style("border-radius", "4px")
        .style("color", "white")
        .style("font-weight", "600")
        .style_signal(
            "background-color",
            run_enabled
                .signal()
                .map_bool(|| "rgb(37, 99, 235)", || "rgb(148, 163, 184)"),
        )
        .style_signal(
            "cursor",
            run_enabled.signal().map_bool(|| "pointer", || "not-allowed"),
        )
        .style_signal("pointer-events", run_enabled.signal().map_false(|| "none"))
        .event_handler(move |_: events::Click| on_run())
        .child(Text::new("Run GSEA"))
}

/// Input fields plus the run control, which is disabled whenever
/// `run_enabled` is false.
pub fn form_panel(
    fields: &FormFields,
    run_enabled: &Mutable<bool>,
    on_run: impl FnMut() + 'static,
) -> impl Element {
    Column::new()
        .s(Width::fill().max(720))
        .s(Gap::new().y(12))
        .item(field("Genes", "TP53, BRCA1, MYC", &fields.genes))
        .item(field("Metric", "2.5, 1.8, -0.4", &fields.metric))
        .item(field("Gene sets (JSON)", r#"{"SET": ["TP53", "MYC"]}"#, &fields.gene_sets))
        .item(
            Row::new()
                .s(Width::fill())
                .s(Gap::new().x(12))
                .item(field("Weight", "1.0", &fields.weight))
                .item(field("Min size", "1", &fields.min_size))
                .item(field("Max size", "500", &fields.max_size)),
        )
        .item(
            Row::new()
                .s(Width::fill())
                .s(Gap::new().x(12))
                .item(field("Permutations", "1000", &fields.nperm))
                .item(field("Seed", "123", &fields.seed)),
        )
        .item(run_button(run_enabled, on_run))
}
