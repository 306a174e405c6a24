use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::Result;

pub const DEFAULT_WORD_COUNT: usize = 30;
pub const DEFAULT_API_URL: &str = "https://random-word-api.herokuapp.com";

static WORDLIST_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/wordlists");

/// Provider of the words for one session.
///
/// Implementations never fail: on any problem they log it and return an
/// empty list, which makes for an empty (but valid) session.
pub trait WordSource {
    fn fetch(&self, count: usize, lang: &str) -> Vec<String>;
}

/// Random words from the public random-word API.
#[derive(Debug, Clone)]
pub struct HttpWordSource {
    base_url: String,
}

impl HttpWordSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn try_fetch(&self, count: usize, lang: &str) -> reqwest::Result<Vec<String>> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()?;

        let url = format!("{}/word", self.base_url.trim_end_matches('/'));
        client
            .get(url)
            .query(&[("number", count.to_string()), ("lang", lang.to_string())])
            .send()?
            .error_for_status()?
            .json::<Vec<String>>()
    }
}

impl Default for HttpWordSource {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl WordSource for HttpWordSource {
    fn fetch(&self, count: usize, lang: &str) -> Vec<String> {
        match self.try_fetch(count, lang) {
            Ok(words) => {
                info!(count = words.len(), lang, "fetched words");
                words
            }
            Err(err) => {
                warn!(%err, url = %self.base_url, "fetching words failed, starting with an empty list");
                Vec::new()
            }
        }
    }
}

/// Word list bundled into the binary
#[derive(Deserialize, Clone, Debug)]
pub struct WordList {
    pub name: String,
    pub code: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl WordList {
    /// Bundled list for a language code such as `en` or `de`.
    pub fn for_code(code: &str) -> Result<Option<WordList>> {
        for file in WORDLIST_DIR.files() {
            let Some(contents) = file.contents_utf8() else {
                continue;
            };
            let list: WordList = serde_json::from_str(contents)?;
            if list.code == code {
                return Ok(Some(list));
            }
        }
        Ok(None)
    }

    pub fn random(&self, count: usize) -> Vec<String> {
        let mut rng = rand::thread_rng();
        (0..count)
            .filter_map(|_| self.words.choose(&mut rng).cloned())
            .collect()
    }
}

/// Random words from the bundled lists, for playing without network.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineWordSource;

impl WordSource for OfflineWordSource {
    fn fetch(&self, count: usize, lang: &str) -> Vec<String> {
        let list = match WordList::for_code(lang) {
            Ok(None) => {
                debug!(lang, "no bundled word list, falling back to english");
                WordList::for_code("en")
            }
            found => found,
        };

        match list {
            Ok(Some(list)) => list.random(count),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%err, "bundled word list is unreadable");
                Vec::new()
            }
        }
    }
}

/// The same words every time, e.g. from `--prompt`.
#[derive(Debug, Clone, Default)]
pub struct FixedWordSource {
    words: Vec<String>,
}

impl FixedWordSource {
    pub fn from_text(text: &str) -> Self {
        Self {
            words: text.split_whitespace().map(str::to_string).collect(),
        }
    }
}

impl WordSource for FixedWordSource {
    fn fetch(&self, _count: usize, _lang: &str) -> Vec<String> {
        self.words.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serve a single canned HTTP response and report the request line.
    fn serve_once(status: &str, body: &str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header == "\r\n" || header.is_empty() {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).unwrap();
            tx.send(request_line).unwrap();
        });

        (url, rx)
    }

    #[test]
    fn test_http_source_parses_word_array() {
        let (url, requests) = serve_once("200 OK", r#"["apple","tree","river"]"#);

        let words = HttpWordSource::new(url).fetch(3, "en");

        assert_eq!(words, vec!["apple", "tree", "river"]);
        let request_line = requests.recv().unwrap();
        assert!(request_line.starts_with("GET /word?number=3&lang=en "));
    }

    #[test]
    fn test_http_source_error_status_yields_empty() {
        let (url, _requests) = serve_once("503 Service Unavailable", "[]");
        assert!(HttpWordSource::new(url).fetch(30, "en").is_empty());
    }

    #[test]
    fn test_http_source_bad_json_yields_empty() {
        let (url, _requests) = serve_once("200 OK", r#"{"words": 1}"#);
        assert!(HttpWordSource::new(url).fetch(30, "en").is_empty());
    }

    #[test]
    fn test_http_source_unreachable_yields_empty() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        assert!(HttpWordSource::new(url).fetch(30, "en").is_empty());
    }

    #[test]
    fn test_bundled_lists() {
        let en = WordList::for_code("en").unwrap().unwrap();
        assert_eq!(en.name, "english");
        assert_eq!(en.size as usize, en.words.len());

        let de = WordList::for_code("de").unwrap().unwrap();
        assert!(de.words.iter().any(|w| w.contains('ü')));

        assert!(WordList::for_code("xx").unwrap().is_none());
    }

    #[test]
    fn test_offline_source() {
        let words = OfflineWordSource.fetch(DEFAULT_WORD_COUNT, "en");
        assert_eq!(words.len(), DEFAULT_WORD_COUNT);
        assert!(words.iter().all(|w| !w.is_empty() && !w.contains(' ')));

        // unknown languages fall back to english
        assert_eq!(OfflineWordSource.fetch(5, "tlh").len(), 5);
    }

    #[test]
    fn test_fixed_source() {
        let source = FixedWordSource::from_text("  the quick\tfox ");
        assert_eq!(source.fetch(30, "en"), vec!["the", "quick", "fox"]);
    }
}
