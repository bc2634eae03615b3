//! Transaction view model
//!
//! Derives the visible rows from the fetched transactions and the user's
//! filter, sort and page selection. [`view`] and [`filter_and_sort`] are pure;
//! [`TransactionsView`] holds the selection and keeps the page index in range
//! whenever the filter, the page size or the collection changes.

use crate::models::{Transaction, TransactionData};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Column the table is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Date,
    Username,
    Amount,
}

impl std::str::FromStr for SortKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "username" => Ok(SortKey::Username),
            "amount" => Ok(SortKey::Amount),
            _ => Err(format!("Invalid sort key: {}", s)),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Date => write!(f, "date"),
            SortKey::Username => write!(f, "username"),
            SortKey::Amount => write!(f, "amount"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Invalid sort order: {}", s)),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            key: SortKey::Date,
            order: SortOrder::Desc,
        }
    }
}

impl Sort {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// Column header click: the active ascending column flips to
    /// descending, anything else becomes ascending.
    pub fn request(self, key: SortKey) -> Self {
        let is_asc = self.key == key && self.order == SortOrder::Asc;
        Self {
            key,
            order: if is_asc { SortOrder::Desc } else { SortOrder::Asc },
        }
    }

    /// Every key/order pair, in the order the sort picker lists them
    pub fn choices() -> [Sort; 6] {
        use SortKey::*;
        use SortOrder::*;
        [
            Sort::new(Date, Desc),
            Sort::new(Date, Asc),
            Sort::new(Username, Asc),
            Sort::new(Username, Desc),
            Sort::new(Amount, Asc),
            Sort::new(Amount, Desc),
        ]
    }

    fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        let ordering = match self.key {
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::Username => a.username.cmp(&b.username),
            SortKey::Amount => a.amount.cmp(&b.amount),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// `key:order`, e.g. `amount:desc`
impl std::str::FromStr for Sort {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, order) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid sort: {}", s))?;
        Ok(Sort::new(key.parse()?, order.parse()?))
    }
}

impl std::fmt::Display for Sort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.key, self.order)
    }
}

/// Predicate narrowing the visible transactions. Unset clauses match all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub credit: bool,
    pub debit: bool,
    /// Substring of the counterparty name
    pub name: Option<String>,
    /// Absolute amount, as typed
    pub amount: Option<String>,
    pub date: Option<NaiveDate>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            credit: true,
            debit: true,
            name: None,
            amount: None,
            date: None,
            date_from: None,
            date_to: None,
        }
    }
}

impl Filter {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        let type_ok = (self.credit && tx.amount > 0) || (self.debit && tx.amount < 0);
        if !type_ok {
            return false;
        }

        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            if !tx.username.contains(name) {
                return false;
            }
        }

        if let Some(amount) = self.amount.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            match amount.parse::<i64>() {
                Ok(wanted) if tx.amount.checked_abs() == Some(wanted) => {}
                _ => return false,
            }
        }

        if self.date.is_some() || self.date_from.is_some() || self.date_to.is_some() {
            let day = match transaction_day(&tx.date) {
                Some(day) => day,
                None => return false,
            };
            if self.date.map_or(false, |d| d != day)
                || self.date_from.map_or(false, |from| day < from)
                || self.date_to.map_or(false, |to| day > to)
            {
                return false;
            }
        }

        true
    }
}

/// Calendar day of a transaction timestamp
pub fn transaction_day(date: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.date_naive());
    }
    date.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// One page of the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionView {
    pub rows: Vec<Transaction>,
    /// Rows matching the filter, across all pages
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
}

/// Matching transactions in display order (stable: ties keep fetch order)
pub fn filter_and_sort(transactions: &[Transaction], filter: &Filter, sort: Sort) -> Vec<Transaction> {
    let mut rows: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| filter.matches(tx))
        .cloned()
        .collect();
    rows.sort_by(|a, b| sort.compare(a, b));
    rows
}

/// Number of pages needed for `total` rows; at least one
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    ((total + page_size - 1) / page_size).max(1)
}

/// Pull a page index back into range for `total` rows
pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.min(page_count(total, page_size) - 1)
}

/// Filter, sort and slice out one page
pub fn view(
    transactions: &[Transaction],
    filter: &Filter,
    sort: Sort,
    page: usize,
    page_size: usize,
) -> TransactionView {
    let sorted = filter_and_sort(transactions, filter, sort);
    let total_count = sorted.len();
    let rows = sorted
        .into_iter()
        .skip(page.saturating_mul(page_size))
        .take(page_size)
        .collect();

    TransactionView {
        rows,
        total_count,
        page,
        page_size,
        page_count: page_count(total_count, page_size),
    }
}

/// Prefill for "repeat": debits only, amount sign flipped so the user
/// confirms the direction again.
pub fn repeat_prefill(tx: &Transaction) -> Option<TransactionData> {
    if !tx.is_debit() {
        return None;
    }
    Some(TransactionData {
        name: tx.username.clone(),
        amount: -tx.amount,
    })
}

/// Filter, sort and page selection of the transactions table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionsView {
    filter: Filter,
    sort: Sort,
    page: usize,
    page_size: usize,
    page_size_options: Vec<usize>,
}

impl TransactionsView {
    pub fn new(page_size: usize, page_size_options: Vec<usize>) -> Self {
        Self {
            filter: Filter::default(),
            sort: Sort::default(),
            page: 0,
            page_size: page_size.max(1),
            page_size_options,
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    pub fn set_filter(&mut self, filter: Filter, transactions: &[Transaction]) {
        self.filter = filter;
        self.clamp(transactions);
    }

    pub fn reset_filter(&mut self, transactions: &[Transaction]) {
        self.filter.reset();
        self.clamp(transactions);
    }

    pub fn request_sort(&mut self, key: SortKey) {
        self.sort = self.sort.request(key);
    }

    pub fn set_sort(&mut self, sort: Sort) {
        self.sort = sort;
    }

    pub fn set_page(&mut self, page: usize, transactions: &[Transaction]) {
        self.page = page;
        self.clamp(transactions);
    }

    /// Unknown sizes are ignored; a new size starts at the first page.
    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        if page_size == 0 || !self.page_size_options.contains(&page_size) {
            return false;
        }
        self.page_size = page_size;
        self.page = 0;
        true
    }

    /// Call after every fetch replaced the collection
    pub fn transactions_changed(&mut self, transactions: &[Transaction]) {
        self.clamp(transactions);
    }

    pub fn current(&self, transactions: &[Transaction]) -> TransactionView {
        view(transactions, &self.filter, self.sort, self.page, self.page_size)
    }

    /// All matching rows, unpaginated (compact list layout)
    pub fn all(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        filter_and_sort(transactions, &self.filter, self.sort)
    }

    fn clamp(&mut self, transactions: &[Transaction]) {
        let total = transactions.iter().filter(|tx| self.filter.matches(tx)).count();
        let clamped = clamp_page(self.page, total, self.page_size);
        if clamped != self.page {
            log::debug!("Page {} out of range for {} rows, moving to {}", self.page, total, clamped);
            self.page = clamped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: u64, date: &str, username: &str, amount: i64) -> Transaction {
        Transaction {
            id,
            date: date.to_string(),
            username: username.to_string(),
            amount,
            balance: 0,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx(1, "2020-05-01T10:00:00.000Z", "bob", -50),
            tx(2, "2020-05-02T10:00:00.000Z", "carol", 20),
            tx(3, "2020-05-03T10:00:00.000Z", "bobby", -20),
            tx(4, "2020-05-03T12:00:00.000Z", "dave", 50),
            tx(5, "2020-05-04T10:00:00.000Z", "erin", -5),
            tx(6, "2020-05-05T10:00:00.000Z", "bob", 70),
            tx(7, "2020-05-06T10:00:00.000Z", "frank", -70),
        ]
    }

    fn ids(rows: &[Transaction]) -> Vec<u64> {
        rows.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_type_filter() {
        let all = sample();
        let credits = Filter { debit: false, ..Filter::default() };
        assert_eq!(ids(&filter_and_sort(&all, &credits, Sort::new(SortKey::Date, SortOrder::Asc))), vec![2, 4, 6]);

        let none = Filter { debit: false, credit: false, ..Filter::default() };
        assert!(filter_and_sort(&all, &none, Sort::default()).is_empty());
    }

    #[test]
    fn test_name_filter_is_substring() {
        let filter = Filter { name: Some("bob".to_string()), ..Filter::default() };
        let rows = filter_and_sort(&sample(), &filter, Sort::new(SortKey::Date, SortOrder::Asc));
        assert_eq!(ids(&rows), vec![1, 3, 6]);

        let empty = Filter { name: Some(String::new()), ..Filter::default() };
        assert_eq!(filter_and_sort(&sample(), &empty, Sort::default()).len(), 7);
    }

    #[test]
    fn test_amount_filter_uses_absolute_value() {
        let filter = Filter { amount: Some("50".to_string()), ..Filter::default() };
        let rows = filter_and_sort(&sample(), &filter, Sort::new(SortKey::Date, SortOrder::Asc));
        assert_eq!(ids(&rows), vec![1, 4]);

        let junk = Filter { amount: Some("fifty".to_string()), ..Filter::default() };
        assert!(filter_and_sort(&sample(), &junk, Sort::default()).is_empty());
    }

    #[test]
    fn test_date_filters() {
        let day = NaiveDate::from_ymd_opt(2020, 5, 3).unwrap();
        let filter = Filter { date: Some(day), ..Filter::default() };
        let rows = filter_and_sort(&sample(), &filter, Sort::new(SortKey::Date, SortOrder::Asc));
        assert_eq!(ids(&rows), vec![3, 4]);

        let range = Filter {
            date_from: NaiveDate::from_ymd_opt(2020, 5, 2),
            date_to: NaiveDate::from_ymd_opt(2020, 5, 4),
            ..Filter::default()
        };
        let rows = filter_and_sort(&sample(), &range, Sort::new(SortKey::Date, SortOrder::Asc));
        assert_eq!(ids(&rows), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_unparsable_date_fails_date_clause() {
        let rows = vec![tx(1, "yesterday", "bob", -1)];
        let filter = Filter { date: NaiveDate::from_ymd_opt(2020, 5, 3), ..Filter::default() };
        assert!(filter_and_sort(&rows, &filter, Sort::default()).is_empty());
        assert_eq!(filter_and_sort(&rows, &Filter::default(), Sort::default()).len(), 1);
    }

    #[test]
    fn test_transaction_day_formats() {
        let day = NaiveDate::from_ymd_opt(2020, 5, 3);
        assert_eq!(transaction_day("2020-05-03T10:00:00.000Z"), day);
        assert_eq!(transaction_day("2020-05-03"), day);
        assert_eq!(transaction_day("2020-05-03 10:00"), day);
        assert_eq!(transaction_day("05/03/2020"), None);
    }

    #[test]
    fn test_sort_is_stable() {
        let rows = vec![
            tx(1, "2020-01-01", "x", -20),
            tx(2, "2020-01-02", "y", 20),
            tx(3, "2020-01-03", "z", -20),
            tx(4, "2020-01-04", "w", 5),
        ];
        let asc = filter_and_sort(&rows, &Filter::default(), Sort::new(SortKey::Amount, SortOrder::Asc));
        assert_eq!(ids(&asc), vec![1, 3, 4, 2]);
        let desc = filter_and_sort(&rows, &Filter::default(), Sort::new(SortKey::Amount, SortOrder::Desc));
        assert_eq!(ids(&desc), vec![2, 4, 1, 3]);

        let by_name = vec![tx(1, "a", "bob", 1), tx(2, "b", "amy", 1), tx(3, "c", "bob", 2)];
        let sorted = filter_and_sort(&by_name, &Filter::default(), Sort::new(SortKey::Username, SortOrder::Asc));
        assert_eq!(ids(&sorted), vec![2, 1, 3]);
    }

    #[test]
    fn test_sort_request_toggles() {
        let sort = Sort::default();
        let sort = sort.request(SortKey::Date);
        assert_eq!(sort, Sort::new(SortKey::Date, SortOrder::Asc));
        let sort = sort.request(SortKey::Date);
        assert_eq!(sort, Sort::new(SortKey::Date, SortOrder::Desc));
        let sort = sort.request(SortKey::Amount);
        assert_eq!(sort, Sort::new(SortKey::Amount, SortOrder::Asc));
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!("amount:desc".parse::<Sort>(), Ok(Sort::new(SortKey::Amount, SortOrder::Desc)));
        assert_eq!("Username:ASC".parse::<Sort>(), Ok(Sort::new(SortKey::Username, SortOrder::Asc)));
        assert!("amount".parse::<Sort>().is_err());
        assert!("amount:sideways".parse::<Sort>().is_err());
        for sort in Sort::choices() {
            assert_eq!(sort.to_string().parse::<Sort>(), Ok(sort));
        }
    }

    #[test]
    fn test_view_paginates() {
        let page0 = view(&sample(), &Filter::default(), Sort::new(SortKey::Date, SortOrder::Asc), 0, 5);
        assert_eq!(ids(&page0.rows), vec![1, 2, 3, 4, 5]);
        assert_eq!(page0.total_count, 7);
        assert_eq!(page0.page_count, 2);

        let page1 = view(&sample(), &Filter::default(), Sort::new(SortKey::Date, SortOrder::Asc), 1, 5);
        assert_eq!(ids(&page1.rows), vec![6, 7]);
    }

    #[test]
    fn test_view_is_pure() {
        let filter = Filter { name: Some("b".to_string()), ..Filter::default() };
        let a = view(&sample(), &filter, Sort::default(), 0, 5);
        let b = view(&sample(), &filter, Sort::default(), 0, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(1, 3, 5), 0);
        assert_eq!(clamp_page(1, 7, 5), 1);
        assert_eq!(clamp_page(2, 10, 5), 1);
        assert_eq!(clamp_page(3, 0, 5), 0);
    }

    #[test]
    fn test_page_is_clamped_when_filter_shrinks() {
        let all = sample();
        let mut state = TransactionsView::new(5, vec![5, 10, 25]);
        state.set_page(1, &all);
        assert_eq!(state.page(), 1);
        assert_eq!(state.current(&all).rows.len(), 2);

        let credits = Filter { debit: false, ..Filter::default() };
        state.set_filter(credits, &all);
        assert_eq!(state.current(&all).total_count, 3);
        assert_eq!(state.page(), 0);
    }

    #[test]
    fn test_page_is_clamped_when_collection_shrinks() {
        let all = sample();
        let mut state = TransactionsView::new(5, vec![5, 10, 25]);
        state.set_page(1, &all);
        let fewer: Vec<Transaction> = all.into_iter().take(3).collect();
        state.transactions_changed(&fewer);
        assert_eq!(state.page(), 0);
    }

    #[test]
    fn test_set_page_beyond_last_is_clamped() {
        let all = sample();
        let mut state = TransactionsView::new(5, vec![5, 10, 25]);
        state.set_page(9, &all);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let all = sample();
        let mut state = TransactionsView::new(5, vec![5, 10, 25]);
        state.set_page(1, &all);
        assert!(state.set_page_size(10));
        assert_eq!(state.page(), 0);
        assert!(!state.set_page_size(7));
        assert_eq!(state.page_size(), 10);
    }

    #[test]
    fn test_reset_filter() {
        let all = sample();
        let mut state = TransactionsView::new(5, vec![5]);
        state.set_filter(Filter { name: Some("zzz".to_string()), ..Filter::default() }, &all);
        assert_eq!(state.current(&all).total_count, 0);
        state.reset_filter(&all);
        assert!(state.filter().is_default());
        assert_eq!(state.current(&all).total_count, 7);
    }

    #[test]
    fn test_repeat_prefill_flips_debit_sign() {
        let debit = tx(1, "2020-05-01", "bob", -50);
        assert_eq!(
            repeat_prefill(&debit),
            Some(TransactionData { name: "bob".to_string(), amount: 50 })
        );
        assert_eq!(repeat_prefill(&tx(2, "2020-05-01", "carol", 20)), None);
    }
}
