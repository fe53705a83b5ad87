use shared::view::{PENDING_TEXT, TABLE_HEADER};
use shared::{Phase, ResultView, SummaryRow};
use zoon::*;

type HtmlEl = RawHtmlEl<web_sys::HtmlElement>;

/// One line naming the handshake/run phase.
pub fn status_line(phase: impl Signal<Item = Phase> + Unpin + 'static) -> impl Element {
    El::new()
        .s(Font::new().size(13).color("rgb(100, 116, 139)"))
        .update_raw_el(|raw_el| raw_el.attr("role", "status"))
        .child(Text::with_signal(phase.map(|phase| format!("Status: {}", phase.label()))))
}

/// Results area. Every string lands in a text node, so worker-supplied
/// messages and term names are never parsed as markup.
pub fn results_panel(view: impl Signal<Item = ResultView> + Unpin + 'static) -> impl Element {
    El::new()
        .s(Width::fill())
        .update_raw_el(|raw_el| raw_el.attr("id", "results"))
        .child_signal(view.map(|view| render_view(&view)))
}

fn render_view(view: &ResultView) -> Option<HtmlEl> {
    match view {
        ResultView::Empty => None,
        ResultView::Pending => Some(RawHtmlEl::new("p").child(Text::new(PENDING_TEXT))),
        ResultView::Table(rows) => Some(
            RawHtmlEl::new("div")
                .child(heading(view))
                .child(summary_table(rows)),
        ),
        ResultView::Failure(message) => Some(
            RawHtmlEl::new("div")
                .attr("role", "alert")
                .style("color", "rgb(185, 28, 28)")
                .child(heading(view))
                .child(RawHtmlEl::new("p").child(Text::new(message.clone()))),
        ),
    }
}

fn heading(view: &ResultView) -> HtmlEl {
    RawHtmlEl::new("h2").child(Text::new(view.heading().unwrap_or_default()))
}

fn summary_table(rows: &[SummaryRow]) -> HtmlEl {
    let header = RawHtmlEl::new("tr").children(
        TABLE_HEADER
            .iter()
            .map(|title| cell("th", title.to_string())),
    );
    let body = rows.iter().map(|row| {
        RawHtmlEl::new("tr").children(row.cells().iter().map(|text| cell("td", text.to_string())))
    });
    RawHtmlEl::new("table")
        .style("border-collapse", "collapse")
        .child(RawHtmlEl::new("thead").child(header))
        .child(RawHtmlEl::new("tbody").children(body))
}

fn cell(tag: &'static str, text: String) -> HtmlEl {
    RawHtmlEl::new(tag)
        .style("padding", "4px 12px")
        .style("text-align", "left")
        .style("border-bottom", "1px solid rgb(226, 232, 240)")
        .child(Text::new(text))
}
