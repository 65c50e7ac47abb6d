use std::time::Duration;

use tracing::{debug, warn};

use super::target::{ChoiceGroup, ChoiceOption};
use crate::dom::{Document, DomError, EventKind, NodeId};
use crate::models::ChoiceStyle;

/// Writes `value` and fires the notifications a reactive page listens for.
pub fn fill_text(doc: &mut Document, input: NodeId, value: &str) -> Result<(), DomError> {
    doc.set_value(input, value)?;
    doc.dispatch(input, EventKind::Input);
    doc.dispatch(input, EventKind::Change);
    Ok(())
}

/// Fills a date-picker widget: open it, let it render, type the date, then
/// click elsewhere to close it.
///
/// A native `<input type="date">` has no popup and is filled as text.
pub async fn fill_date(
    doc: &mut Document,
    input: NodeId,
    value: &str,
    settle: Duration,
) -> Result<(), DomError> {
    if doc.input_type(input).as_deref() == Some("date") {
        return fill_text(doc, input, value);
    }

    doc.click(input)?;
    tokio::time::sleep(settle).await;
    fill_text(doc, input, value)?;
    if let Some(body) = doc.body() {
        doc.click(body)?;
    }
    doc.dispatch(input, EventKind::Blur);
    Ok(())
}

/// Picks the first `<option>` whose text contains `value`, ignoring case.
pub fn fill_native_select(
    doc: &mut Document,
    select: NodeId,
    value: &str,
) -> Result<bool, DomError> {
    let wanted = value.to_lowercase();
    let matched = doc
        .options(select)
        .into_iter()
        .enumerate()
        .find(|(_, option)| doc.text_content(*option).to_lowercase().contains(&wanted));

    let Some((index, option)) = matched else {
        warn!(value, "no matching option in select");
        return Ok(false);
    };
    debug!(value, index, "selecting native option");
    doc.select_option(select, option)?;
    doc.dispatch(select, EventKind::Change);
    Ok(true)
}

/// Opens a custom combobox and clicks the rendered option whose text is
/// exactly `value`. Leaves the widget alone when it already shows `value`.
///
/// Rendered options need not carry `role="option"`, so the selection is
/// recorded on the option list and the control here rather than left to the
/// click.
pub async fn fill_combobox(
    doc: &mut Document,
    control: NodeId,
    current: Option<&str>,
    option_selector: &str,
    value: &str,
    settle: Duration,
) -> Result<bool, DomError> {
    if current.map(str::trim) == Some(value) {
        debug!(value, "combobox already set");
        return Ok(true);
    }

    doc.click(control)?;
    tokio::time::sleep(settle).await;

    let options = doc.select(option_selector)?;
    debug!(count = options.len(), "combobox options rendered");
    let Some(option) = options
        .iter()
        .copied()
        .find(|option| doc.text_content(*option) == value)
    else {
        warn!(value, "combobox option not found");
        return Ok(false);
    };
    doc.click(option)?;

    for other in options.into_iter().filter(|o| *o != option) {
        doc.set_attr(other, "aria-selected", "false")?;
    }
    doc.set_attr(option, "aria-selected", "true")?;
    doc.set_value(control, value)?;
    doc.dispatch(control, EventKind::Change);
    Ok(true)
}

fn caption(option: &ChoiceOption) -> &str {
    let label = option.label.trim();
    if label.is_empty() {
        option.value.as_deref().unwrap_or_default().trim()
    } else {
        label
    }
}

/// The option in `group` that answers `value`.
///
/// The form's own spelling (`Yes`, `Y`) is preferred; either spelling is
/// then accepted regardless of case, first in the caption and then in the
/// option's `value`. Last comes any caption containing `yes` / `no`.
pub fn choose_option(group: &ChoiceGroup, value: bool, style: ChoiceStyle) -> Option<&ChoiceOption> {
    let preferred = style.token(value);
    let word = ChoiceStyle::Word.token(value);
    let letter = ChoiceStyle::Letter.token(value);
    let fragment = word.to_lowercase();
    let answers = |text: &str| {
        let text = text.trim();
        text.eq_ignore_ascii_case(word) || text.eq_ignore_ascii_case(letter)
    };

    group
        .options
        .iter()
        .find(|o| caption(o) == preferred)
        .or_else(|| group.options.iter().find(|o| answers(caption(o))))
        .or_else(|| {
            group
                .options
                .iter()
                .find(|o| o.value.as_deref().is_some_and(answers))
        })
        .or_else(|| {
            group
                .options
                .iter()
                .find(|o| caption(o).to_lowercase().contains(&fragment))
        })
}

pub fn pick_choice(
    doc: &mut Document,
    group: &ChoiceGroup,
    value: bool,
    style: ChoiceStyle,
) -> Result<bool, DomError> {
    let Some(option) = choose_option(group, value, style) else {
        warn!(
            wanted = style.token(value),
            options = group.options.len(),
            "no matching choice option"
        );
        return Ok(false);
    };
    doc.click(option.node)?;
    Ok(true)
}
