//! Daily quote.

use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::schedule;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

const BUILTIN: &[(&str, &str)] = &[
    ("오늘 할 수 있는 일을 내일로 미루지 마라.", "벤저민 프랭클린"),
    ("성공은 매일 반복한 작은 노력들의 합이다.", "로버트 콜리어"),
    ("시작이 반이다.", "한국 속담"),
    ("천리 길도 한 걸음부터.", "한국 속담"),
    ("불가능이란 노력하지 않는 자의 변명이다.", "나폴레옹"),
    ("당신이 할 수 있다고 믿든 할 수 없다고 믿든 당신이 옳다.", "헨리 포드"),
    ("기회는 준비된 자에게만 온다.", "루이 파스퇴르"),
    ("행동은 모든 성공의 기초이다.", "파블로 피카소"),
    ("최선을 다하면 최고가 된다.", "알 수 없음"),
    ("포기하지 않으면 실패하지 않는다.", "알 수 없음"),
    ("작은 것을 소홀히 하지 마라. 큰 것은 작은 것들의 집합이다.", "이소룡"),
    ("오늘이 인생의 첫날이라고 생각하라.", "파울로 코엘료"),
    ("변화하지 않으면 성장하지 않는다. 성장하지 않으면 진정으로 살아있는 것이 아니다.", "게일 시히"),
    ("실패는 성공의 어머니다.", "토마스 에디슨"),
    ("노력 없이 얻을 수 있는 것은 아무것도 없다.", "시어도어 루스벨트"),
    ("The only way to do great work is to love what you do.", "Steve Jobs"),
    ("Success is not final, failure is not fatal: it is the courage to continue that counts.", "Winston Churchill"),
    ("Believe you can and you're halfway there.", "Theodore Roosevelt"),
    ("The future belongs to those who believe in the beauty of their dreams.", "Eleanor Roosevelt"),
    ("It does not matter how slowly you go as long as you do not stop.", "Confucius"),
    ("Everything you've ever wanted is on the other side of fear.", "George Addair"),
    ("Don't watch the clock; do what it does. Keep going.", "Sam Levenson"),
    ("The harder you work for something, the greater you'll feel when you achieve it.", "Unknown"),
    ("Dream bigger. Do bigger.", "Unknown"),
    ("Don't stop when you're tired. Stop when you're done.", "Unknown"),
    ("Focus on being productive instead of busy.", "Tim Ferriss"),
    ("The best time to plant a tree was 20 years ago. The second best time is now.", "Chinese Proverb"),
    ("Your limitation—it's only your imagination.", "Unknown"),
    ("Great things never come from comfort zones.", "Unknown"),
    ("Dream it. Wish it. Do it.", "Unknown"),
    ("Success doesn't just find you. You have to go out and get it.", "Unknown"),
    ("The key to success is to focus on goals, not obstacles.", "Unknown"),
    ("Don't wait for opportunity. Create it.", "Unknown"),
    ("Sometimes we're tested not to show our weaknesses, but to discover our strengths.", "Unknown"),
    ("The difference between ordinary and extraordinary is that little extra.", "Jimmy Johnson"),
];

/// Index of the quote for `date`: `(y*10000 + m*100 + d) % len`.
pub fn daily_index(date: NaiveDate, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let seed = i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day());
    usize::try_from(seed.rem_euclid(len as i64)).ok()
}

#[derive(Debug, Clone)]
pub struct QuoteBook {
    quotes: Vec<Quote>,
}

impl Default for QuoteBook {
    fn default() -> Self {
        Self::builtin()
    }
}

impl QuoteBook {
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self { quotes }
    }

    pub fn builtin() -> Self {
        Self::new(
            BUILTIN
                .iter()
                .map(|(text, author)| Quote {
                    text: text.to_string(),
                    author: author.to_string(),
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Same quote all day.
    pub fn daily(&self, date: NaiveDate) -> Option<&Quote> {
        daily_index(date, self.quotes.len()).and_then(|i| self.quotes.get(i))
    }

    pub fn random(&self) -> Option<&Quote> {
        self.quotes.choose(&mut rand::thread_rng())
    }
}

/// The quote on display, rolled over at local midnight.
#[derive(Debug, Clone)]
pub struct QuoteBoard {
    book: Arc<QuoteBook>,
    current: Arc<RwLock<Option<Quote>>>,
}

impl QuoteBoard {
    pub fn new(book: QuoteBook) -> Self {
        let today = Local::now().date_naive();
        let current = book.daily(today).cloned();
        Self {
            book: Arc::new(book),
            current: Arc::new(RwLock::new(current)),
        }
    }

    pub fn current(&self) -> Option<Quote> {
        self.current.read().clone()
    }

    /// Show a random quote until the next rollover.
    pub fn shuffle(&self) -> Option<Quote> {
        let quote = self.book.random().cloned();
        *self.current.write() = quote.clone();
        quote
    }

    /// Show the daily quote for `date`.
    pub fn show_daily(&self, date: NaiveDate) -> Option<Quote> {
        let quote = self.book.daily(date).cloned();
        *self.current.write() = quote.clone();
        quote
    }

    /// Switch to the new day's quote at every local midnight.
    pub fn start_rollover(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let board = self.clone();
        schedule::spawn_at_midnight(cancel, move || {
            let quote = board.show_daily(Local::now().date_naive());
            tracing::info!(
                "New daily quote by {}",
                quote.map(|q| q.author).unwrap_or_default()
            );
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_index_formula() {
        // 20261018 % 7 == 1
        assert_eq!(daily_index(date(2026, 10, 18), 7), Some(1));
        assert_eq!(daily_index(date(2026, 10, 18), 1), Some(0));
        assert_eq!(daily_index(date(2026, 10, 18), 0), None);
    }

    #[test]
    fn test_daily_quote_is_stable_within_a_day() {
        let book = QuoteBook::builtin();
        let today = date(2026, 10, 18);
        assert_eq!(book.daily(today), book.daily(today));
        assert!(book.daily(today).is_some());
    }

    #[test]
    fn test_builtin_book_has_korean_and_english_quotes() {
        let book = QuoteBook::builtin();
        assert_eq!(book.len(), 35);
        // 20261018 % 35 == 8
        assert_eq!(daily_index(date(2026, 10, 18), book.len()), Some(8));
        assert_eq!(
            book.daily(date(2026, 10, 18)).unwrap().text,
            "최선을 다하면 최고가 된다."
        );
        assert_eq!(book.quotes[0].author, "벤저민 프랭클린");
    }

    #[test]
    fn test_random_comes_from_book() {
        let book = QuoteBook::new(vec![Quote {
            text: "only".into(),
            author: "one".into(),
        }]);
        assert_eq!(book.random().unwrap().text, "only");
        assert!(QuoteBook::new(Vec::new()).random().is_none());
    }

    #[test]
    fn test_board_show_daily() {
        let board = QuoteBoard::new(QuoteBook::builtin());
        let day = date(2026, 1, 1);
        let expected = QuoteBook::builtin().daily(day).cloned();
        assert_eq!(board.show_daily(day), expected);
        assert_eq!(board.current(), expected);
    }
}
