//! HTML projection of the session.
//!
//! Every function here reads the session and returns a fragment; nothing is
//! ever read back out of the markup. The page swaps `#board` wholesale after
//! each mutation, so derived values (averages, placeholder ops, highlights)
//! are always current.

use crate::game::board::{CardInstance, UNKNOWN_CARD_NAME};
use crate::game::location::{HandLocation, Location};
use crate::game::persistence::GameIndexEntry;
use crate::game::session::Session;
use crate::game::stats;
use crate::routes::util::{error_span, html_escape};

/// Card text: `"3 - Duck and Cover"`, or `"2.4 - Unknown Card"` for a
/// placeholder standing in at the current deck average.
pub fn card_text(card: &CardInstance, short: bool, deck_average: f64) -> String {
    if card.placeholder {
        format!("{:.1} - {}", deck_average, UNKNOWN_CARD_NAME)
    } else {
        format!("{} - {}", card.ops_value, card.label(short))
    }
}

pub fn render_board(s: &Session) -> String {
    if let Some(err) = s.catalog_error() {
        return format!(r#"<div id="board">{}</div>"#, error_span(err));
    }
    let deck_average = stats::deck_average(s.board());
    let mut html = String::with_capacity(16 * 1024);

    html.push_str(r#"<div id="board">"#);
    render_controls(s, &mut html);

    for hand in [Location::YourHand, Location::OpponentHand] {
        let header = s.location_stats(hand).avg_label();
        html.push_str(&format!(
            r#"<section class="location hand" id="{}-section"><h2>{} <span id="{}-avg">{}</span></h2>"#,
            hand.as_str(),
            hand.title(),
            hand.as_str(),
            header
        ));
        if hand == Location::OpponentHand {
            html.push_str(
                r##"<button class="add-unknown" aria-label="Add unknown card" hx-post="/api/card/placeholder" hx-target="#board" hx-swap="outerHTML">+</button>"##,
            );
        }
        render_cards(s, hand, deck_average, &mut html);
        html.push_str("</section>");
    }

    html.push_str(&format!(
        r#"<section class="location deck" id="deck-section"><h2>Deck <span id="deck-avg">{}</span></h2>"#,
        s.deck_stats().avg_label()
    ));
    for sub in Location::DECK {
        html.push_str(&format!(
            r#"<div class="deck-subsection"><h3>{}</h3>"#,
            sub.title()
        ));
        render_cards(s, sub, deck_average, &mut html);
        html.push_str("</div>");
    }
    html.push_str("</section>");

    for loc in [Location::Discard, Location::Removed] {
        html.push_str(&format!(
            r#"<section class="location" id="{}-section"><h2>{}</h2>"#,
            loc.as_str(),
            loc.title()
        ));
        render_cards(s, loc, deck_average, &mut html);
        html.push_str("</section>");
    }

    // The box is never shown; only its size is.
    html.push_str(&format!(
        r#"<div class="hidden" id="box" data-count="{}"></div>"#,
        s.board().len(Location::Box)
    ));
    html.push_str("</div>");
    html
}

fn render_controls(s: &Session, html: &mut String) {
    html.push_str(r#"<div class="controls">"#);

    html.push_str(r#"<fieldset class="hand-select"><legend>Clicks go to</legend>"#);
    for hand in [HandLocation::YourHand, HandLocation::OpponentHand] {
        let loc = hand.location();
        let checked = if s.selected_hand() == hand { " checked" } else { "" };
        html.push_str(&format!(
            r##"<label><input type="radio" name="hand" value="{}"{} hx-post="/api/hand/select" hx-vals='{{"hand":"{}"}}' hx-target="#board" hx-swap="outerHTML"> {}</label>"##,
            loc.as_str(),
            checked,
            loc.as_str(),
            loc.title()
        ));
    }
    html.push_str("</fieldset>");

    html.push_str(
        r##"<button class="bulk" hx-post="/api/bulk/discards" hx-target="#board" hx-swap="outerHTML">Add Discards</button>"##,
    );
    for (label, path, state) in [
        ("Add Mid War", "/api/bulk/mid-war", s.mid_war()),
        ("Add Late War", "/api/bulk/late-war", s.late_war()),
    ] {
        let disabled = if state.is_released() { " disabled" } else { "" };
        html.push_str(&format!(
            r##"<button class="bulk" hx-post="{}" hx-target="#board" hx-swap="outerHTML"{}>{}</button>"##,
            path, disabled, label
        ));
    }

    // The page shell asks for confirmation when the next undo is a bulk move
    // and then posts `confirm=true`.
    let (bulk, title) = match s.latest_undo() {
        Some(entry) => (entry.kind.is_bulk(), format!("Undo {}", entry.kind.label())),
        None => (false, "Nothing to undo".to_string()),
    };
    html.push_str(&format!(
        r##"<button id="undo" data-bulk-undo="{}" title="{}" hx-post="/api/undo" hx-target="#board" hx-swap="outerHTML"{}>Undo</button>"##,
        bulk,
        html_escape(&title),
        if s.undo_len() == 0 { " disabled" } else { "" }
    ));

    html.push_str(&format!(
        r##"<button class="toggle" aria-pressed="{}" hx-post="/api/view/short-names" hx-target="#board" hx-swap="outerHTML">Short Names</button>"##,
        s.short_names()
    ));

    html.push_str(&render_filters(s));
    html.push_str("</div>");
}

fn render_cards(s: &Session, loc: Location, deck_average: f64, html: &mut String) {
    html.push_str(&format!(r#"<div class="cards" id="{}">"#, loc.as_str()));
    for card in s.board().cards(loc) {
        render_card(s, loc, card, deck_average, html);
    }
    html.push_str("</div>");
}

fn render_card(s: &Session, loc: Location, card: &CardInstance, deck_average: f64, html: &mut String) {
    let id = card.id;
    let mut class = String::from("card");
    if card.placeholder {
        class.push_str(" unknown-card");
    } else {
        class.push(' ');
        class.push_str(card.side.as_str());
    }
    if s.is_highlighted(card) {
        class.push_str(" highlighted");
    }

    html.push_str(&format!(
        r##"<div class="{}" data-id="{}" draggable="true" hx-post="/api/card/click" hx-vals='{{"id":"{}"}}' hx-target="#board" hx-swap="outerHTML">"##,
        class, id, id
    ));
    html.push_str(r#"<div class="card-actions">"#);
    if card.placeholder {
        html.push_str(&format!(
            r##"<button class="card-icon unknown-minus-icon" title="Remove unknown card" hx-post="/api/card/placeholder/remove" hx-vals='{{"id":"{}"}}' hx-trigger="click consume" hx-target="#board" hx-swap="outerHTML">−</button>"##,
            id
        ));
    }
    if card.can_discard(loc) {
        html.push_str(&format!(
            r##"<button class="card-icon discard-icon" title="Discard" hx-post="/api/card/move" hx-vals='{{"id":"{}","to":"discard"}}' hx-trigger="click consume" hx-target="#board" hx-swap="outerHTML">D</button>"##,
            id
        ));
    }
    if card.can_remove(loc) {
        html.push_str(&format!(
            r##"<button class="card-icon remove-icon" title="Remove from game" hx-post="/api/card/move" hx-vals='{{"id":"{}","to":"removed"}}' hx-trigger="click consume" hx-target="#board" hx-swap="outerHTML">R</button>"##,
            id
        ));
    }
    html.push_str("</div>");
    html.push_str(&format!(
        r#"<span class="card-text">{}</span></div>"#,
        html_escape(&card_text(card, s.short_names(), deck_average))
    ));
}

/// Type and region selectors, built from the tags present in the catalog.
pub fn render_filters(s: &Session) -> String {
    let Some(catalog) = s.catalog() else {
        return String::new();
    };
    let mut html = String::with_capacity(1024);
    html.push_str(
        r##"<form class="filters" hx-post="/api/view/filter" hx-trigger="change" hx-target="#board" hx-swap="outerHTML">"##,
    );
    for (name, label, tags, selected) in [
        ("type", "Type", catalog.type_tags(), s.filter().type_tag.as_deref()),
        ("region", "Region", catalog.region_tags(), s.filter().region_tag.as_deref()),
    ] {
        html.push_str(&format!(
            r#"<label>{} <select name="{}"><option value="none">All</option>"#,
            label, name
        ));
        for tag in tags {
            let sel = if selected == Some(tag) { " selected" } else { "" };
            let tag = html_escape(tag);
            html.push_str(&format!(r#"<option value="{}"{}>{}</option>"#, tag, sel, tag));
        }
        html.push_str("</select></label>");
    }
    html.push_str("</form>");
    html
}

/// Games selector plus the title/notes form of the current game.
pub fn render_games(s: &Session, games: &[GameIndexEntry]) -> String {
    let current = s.current_game();
    let mut html = String::with_capacity(1024);
    html.push_str(r#"<div id="games">"#);
    html.push_str(
        r##"<select name="id" hx-post="/api/games/select" hx-trigger="change" hx-target="#games" hx-swap="outerHTML">"##,
    );
    if current.is_none() {
        html.push_str(r#"<option value="" selected>Select a game</option>"#);
    }
    for game in games {
        let sel = if current == Some(game.id.as_str()) { " selected" } else { "" };
        html.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            html_escape(&game.id),
            sel,
            html_escape(&game.display_name)
        ));
    }
    html.push_str("</select>");

    if current.is_some() {
        let details = s.details();
        html.push_str(
            r##"<form class="game-details" hx-post="/api/games/details" hx-trigger="change" hx-target="#games" hx-swap="outerHTML">"##,
        );
        html.push_str(&format!(
            r#"<input type="text" name="title" value="{}">"#,
            html_escape(&details.display_name)
        ));
        html.push_str(&format!(
            r#"<textarea name="notes">{}</textarea>"#,
            html_escape(&details.notes)
        ));
        html.push_str("</form>");
    }
    html.push_str("</div>");
    html
}
