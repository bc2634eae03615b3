//! Transactions panel rendering
//!
//! Helper functions:
//! - render_panel: Banners, filter form and table
//! - render_table: Paginated, sortable table, or the list in list layout
//! - render_list: Compact unpaginated list with a sort picker
//! - render_filter_form: Filter drawer

use crate::render::{banner, display_date, money};
use crate::UiState;
use parrotweb_config::Config;
use parrotweb_core::view::repeat_prefill;
use parrotweb_core::{banner as banner_text, Filter, Sort, SortKey, SortOrder, Transaction};
use parrotweb_utils::escape_html;

/// Table or compact list; kept in [`UiState`] until the user switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    #[default]
    Table,
    List,
}

impl Layout {
    /// `?view=` value; anything else leaves the layout alone
    pub fn from_param(view: Option<&str>) -> Option<Self> {
        match view {
            Some("list") => Some(Layout::List),
            Some("table") => Some(Layout::Table),
            _ => None,
        }
    }
}

/// Error banners, filter form and the table
pub fn render_panel(ui: &UiState, config: &Config, oob: bool) -> String {
    let oob = if oob { " hx-swap-oob='true'" } else { "" };
    format!(
        r#"<section id='transactions-panel'{}>
    {}{}
    {}
    <div id='transactions-table'>{}</div>
</section>"#,
        oob,
        banner(
            banner_text(ui.auth.error.as_deref()).as_deref(),
            "/auth/login/error/clear"
        ),
        banner(
            banner_text(ui.transactions.error.as_deref()).as_deref(),
            "/transactions/error/clear"
        ),
        render_filter_form(ui.view.filter()),
        render_table(ui, config)
    )
}

fn date_value(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// Filter drawer; any change re-renders the table
pub fn render_filter_form(filter: &Filter) -> String {
    let checked = |on: bool| if on { " checked" } else { "" };
    format!(
        r#"<form id='filter-form' class='filters' hx-post='/transactions/filter' hx-target='#transactions-table' hx-trigger='change, input delay:500ms'>
    <label><input type='checkbox' name='credit'{}> Credit</label>
    <label><input type='checkbox' name='debit'{}> Debit</label>
    <label>Name <input type='text' name='name' value='{}'></label>
    <label>Amount <input type='text' name='amount' value='{}'></label>
    <label>Date <input type='date' name='date' value='{}'></label>
    <label>From <input type='date' name='date_from' value='{}'></label>
    <label>To <input type='date' name='date_to' value='{}'></label>
    <button type='button' hx-post='/transactions/filter/reset' hx-target='#transactions-panel' hx-swap='outerHTML'>Reset</button>
</form>"#,
        checked(filter.credit),
        checked(filter.debit),
        escape_html(filter.name.as_deref().unwrap_or("")),
        escape_html(filter.amount.as_deref().unwrap_or("")),
        date_value(filter.date),
        date_value(filter.date_from),
        date_value(filter.date_to)
    )
}

fn sort_indicator(sort: Sort, key: SortKey) -> &'static str {
    match (sort.key == key, sort.order) {
        (false, _) => "",
        (true, SortOrder::Asc) => " &#9650;",
        (true, SortOrder::Desc) => " &#9660;",
    }
}

fn amount_class(tx: &Transaction) -> &'static str {
    if tx.is_credit() {
        "credit"
    } else if tx.is_debit() {
        "debit"
    } else {
        ""
    }
}

fn repeat_button(tx: &Transaction) -> String {
    match repeat_prefill(tx) {
        Some(_) => format!(
            "<button type='button' hx-get='/transactions/create?repeat={}' hx-target='#dialog'>Repeat</button>",
            tx.id
        ),
        None => String::new(),
    }
}

/// Table body for the current filter, sort and page
pub fn render_table(ui: &UiState, config: &Config) -> String {
    if ui.layout == Layout::List {
        return render_list(ui, config);
    }

    let transactions = &ui.transactions.transactions;
    let view = ui.view.current(transactions);
    let sort = ui.view.sort();

    let loading = if ui.transactions.loading {
        "<p class='loading'>Loading...</p>"
    } else {
        ""
    };

    if view.total_count == 0 {
        return format!(
            "{}<p class='empty'>No transactions</p><a href='#' hx-get='/transactions/list?view=list' hx-target='#transactions-table'>Compact view</a>",
            loading
        );
    }

    let headers: String = [
        (SortKey::Date, "Date"),
        (SortKey::Username, "Correspondent"),
        (SortKey::Amount, "Amount"),
    ]
    .iter()
    .map(|(key, label)| {
        format!(
            "<th hx-get='/transactions/list?sort={}' hx-target='#transactions-table'>{}{}</th>",
            key,
            label,
            sort_indicator(sort, *key)
        )
    })
    .collect();

    let rows: String = view
        .rows
        .iter()
        .map(|tx| {
            format!(
                "<tr><td>{}</td><td>{}</td><td class='{}'>{}</td><td>{}</td><td>{}</td></tr>",
                display_date(&tx.date),
                escape_html(&tx.username),
                amount_class(tx),
                money(config, tx.amount),
                money(config, tx.balance),
                repeat_button(tx)
            )
        })
        .collect();

    let page_sizes: String = ui
        .view
        .page_size_options()
        .iter()
        .map(|size| {
            let selected = if *size == view.page_size { " selected" } else { "" };
            format!("<option value='{}'{}>{}</option>", size, selected, size)
        })
        .collect();

    let first = view.page * view.page_size + 1;
    let last = (first + view.rows.len()).saturating_sub(1);
    let prev_disabled = if view.page == 0 { " disabled" } else { "" };
    let next_disabled = if view.page + 1 >= view.page_count { " disabled" } else { "" };

    format!(
        r#"{loading}<table class='transactions'>
    <thead><tr>{headers}<th>Balance</th><th></th></tr></thead>
    <tbody>{rows}</tbody>
</table>
<div class='pagination'>
    <label>Rows per page
        <select name='page_size' hx-get='/transactions/list' hx-target='#transactions-table'>{page_sizes}</select>
    </label>
    <span>{first}-{last} of {total}</span>
    <button type='button' hx-get='/transactions/list?page={prev}' hx-target='#transactions-table'{prev_disabled}>Previous</button>
    <button type='button' hx-get='/transactions/list?page={next}' hx-target='#transactions-table'{next_disabled}>Next</button>
    <a href='#' hx-get='/transactions/list?view=list' hx-target='#transactions-table'>Compact view</a>
</div>"#,
        loading = loading,
        headers = headers,
        rows = rows,
        page_sizes = page_sizes,
        first = first,
        last = last,
        total = view.total_count,
        prev = view.page.saturating_sub(1),
        next = view.page + 1,
        prev_disabled = prev_disabled,
        next_disabled = next_disabled
    )
}

/// Every matching transaction, no paging
pub fn render_list(ui: &UiState, config: &Config) -> String {
    let rows = ui.view.all(&ui.transactions.transactions);
    let items: String = rows
        .iter()
        .map(|tx| {
            format!(
                "<li><span class='date'>{}</span> <span class='user'>{}</span> <span class='{}'>{}</span> {}</li>",
                display_date(&tx.date),
                escape_html(&tx.username),
                amount_class(tx),
                money(config, tx.amount),
                repeat_button(tx)
            )
        })
        .collect();
    let items = if items.is_empty() {
        "<li class='empty'>No transactions</li>".to_string()
    } else {
        items
    };
    format!(
        "{}<ul class='transactions-list'>{}</ul><a href='#' hx-get='/transactions/list?view=table' hx-target='#transactions-table'>Table view</a>",
        render_sort_picker(ui.view.sort()),
        items
    )
}

fn sort_label(sort: Sort) -> String {
    let key = match sort.key {
        SortKey::Date => "Date",
        SortKey::Username => "Name",
        SortKey::Amount => "Amount",
    };
    let order = match sort.order {
        SortOrder::Asc => "ascending",
        SortOrder::Desc => "descending",
    };
    format!("{} {}", key, order)
}

/// Explicit key and direction, for the list which has no headers
pub fn render_sort_picker(current: Sort) -> String {
    let options: String = Sort::choices()
        .iter()
        .map(|sort| {
            let selected = if *sort == current { " selected" } else { "" };
            format!("<option value='{}'{}>{}</option>", sort, selected, sort_label(*sort))
        })
        .collect();
    format!(
        "<label class='sort-picker'>Sort by <select name='order_by' hx-get='/transactions/list' hx-target='#transactions-table'>{}</select></label>",
        options
    )
}
