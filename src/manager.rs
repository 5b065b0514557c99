use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::{
    DictionaryConfig, MAIN_DICT_FILE, PREPOSITION_DICT_FILE, QUANTIFIER_DICT_FILE,
    STOPWORD_DICT_FILE, SUFFIX_DICT_FILE, SURNAME_DICT_FILE,
};
use crate::error::DictError;
use crate::loader::{
    expand_dict_paths, normalize_word, read_dict_file, DbWordSource, RemoteWordSource, WordRecord,
};
use crate::refresh::{DbChannel, DictTarget, RefreshScheduler};
use crate::trie::{Hit, WordTrie};

/// Owns the six dictionary tries, sequences their startup loads, and exposes
/// the matching surface.
///
/// Each trie sits behind `RwLock<Arc<WordTrie>>`: matching clones the `Arc`
/// and walks a frozen structure, a full reload publishes a replacement by
/// swapping the `Arc`, and append merges mutate through `Arc::make_mut`
/// (copy-on-write when a reader still holds the old reference). A `Hit`
/// pins the trie it was produced from, so continuations survive a swap.
pub struct DictionaryManager {
    config: DictionaryConfig,
    remote: RemoteWordSource,
    main: RwLock<Arc<WordTrie>>,
    surname: RwLock<Arc<WordTrie>>,
    quantifier: RwLock<Arc<WordTrie>>,
    suffix: RwLock<Arc<WordTrie>>,
    preposition: RwLock<Arc<WordTrie>>,
    stopwords: RwLock<Arc<WordTrie>>,
    /// DB channels created at init, handed to the scheduler by
    /// `start_refresh`. Each already ran its one-time full load.
    db_channels: std::sync::Mutex<Vec<DbChannel>>,
    refresh_started: AtomicBool,
}

impl DictionaryManager {
    /// Construct the manager and run every mandatory load synchronously.
    ///
    /// Load order: main (base file, local extensions, remote lists), then
    /// surname, quantifier, suffix, preposition, then stop-words (base,
    /// extensions, remote lists), then one full DB load per enabled channel.
    /// A missing surname/quantifier/suffix/preposition base file is fatal;
    /// missing main/stop base files leave those tries empty.
    pub async fn initialize(config: DictionaryConfig) -> Result<Arc<Self>, DictError> {
        let remote = RemoteWordSource::new(config.connect_timeout(), config.read_timeout())?;

        let main = build_main_trie(&config, &remote).await;
        let surname = load_mandatory_trie(&config, SURNAME_DICT_FILE, "surname")?;
        let quantifier = load_mandatory_trie(&config, QUANTIFIER_DICT_FILE, "quantifier")?;
        let suffix = load_mandatory_trie(&config, SUFFIX_DICT_FILE, "suffix")?;
        let preposition = load_mandatory_trie(&config, PREPOSITION_DICT_FILE, "preposition")?;
        let stopwords = build_stop_trie(&config, &remote).await;

        let manager = Arc::new(Self {
            config,
            remote,
            main: RwLock::new(Arc::new(main)),
            surname: RwLock::new(Arc::new(surname)),
            quantifier: RwLock::new(Arc::new(quantifier)),
            suffix: RwLock::new(Arc::new(suffix)),
            preposition: RwLock::new(Arc::new(preposition)),
            stopwords: RwLock::new(Arc::new(stopwords)),
            db_channels: std::sync::Mutex::new(Vec::new()),
            refresh_started: AtomicBool::new(false),
        });

        let channels = manager.initial_db_load().await;
        *lock(&manager.db_channels) = channels;
        Ok(manager)
    }

    /// One-time full DB load for each enabled channel, seeding its watermark.
    async fn initial_db_load(self: &Arc<Self>) -> Vec<DbChannel> {
        let mut channels = Vec::new();
        let Some(db) = &self.config.db else {
            return channels;
        };
        let enabled = [
            (db.enable_ext_dict, &db.ext_dict_table, DictTarget::Main),
            (db.enable_stopwords, &db.stopword_table, DictTarget::Stopwords),
        ];
        for (enable, table, target) in enabled {
            if !enable {
                continue;
            }
            match DbWordSource::connect(&db.url, table, &db.word_field) {
                Ok(source) => {
                    let mut channel = DbChannel::new(source, target, db.refresh_period());
                    channel.run_cycle(self).await;
                    channels.push(channel);
                }
                Err(error) => {
                    tracing::error!(%error, table, "skipping db word channel");
                }
            }
        }
        channels
    }

    /// Start the refresh scheduler. Channels run until `shutdown` (or the
    /// returned handle is dropped). Only the first call schedules anything;
    /// repeat calls return an idle scheduler.
    pub fn start_refresh(self: &Arc<Self>) -> RefreshScheduler {
        if self.refresh_started.swap(true, Ordering::SeqCst) {
            tracing::warn!("refresh scheduler already started");
            return RefreshScheduler::idle();
        }
        let channels = std::mem::take(&mut *lock(&self.db_channels));
        RefreshScheduler::start(Arc::clone(self), channels)
    }

    /// Match a window of `chars` against the main trie.
    pub fn match_main(&self, chars: &[char], begin: usize, length: usize) -> Hit {
        snapshot(&self.main).match_range(chars, begin, length)
    }

    /// Shorthand for matching the whole slice against the main trie.
    pub fn match_main_all(&self, chars: &[char]) -> Hit {
        self.match_main(chars, 0, chars.len())
    }

    pub fn match_quantifier(&self, chars: &[char], begin: usize, length: usize) -> Hit {
        snapshot(&self.quantifier).match_range(chars, begin, length)
    }

    pub fn match_surname(&self, chars: &[char], begin: usize, length: usize) -> Hit {
        snapshot(&self.surname).match_range(chars, begin, length)
    }

    pub fn match_suffix(&self, chars: &[char], begin: usize, length: usize) -> Hit {
        snapshot(&self.suffix).match_range(chars, begin, length)
    }

    pub fn match_preposition(&self, chars: &[char], begin: usize, length: usize) -> Hit {
        snapshot(&self.preposition).match_range(chars, begin, length)
    }

    /// Resume a prior hit with the character at `index`. Valid for the
    /// remainder of the hit's continuation sequence even across a reload.
    pub fn match_with_hit(&self, chars: &[char], index: usize, hit: &Hit) -> Hit {
        hit.advance(chars, index)
    }

    pub fn is_stop_word(&self, chars: &[char], begin: usize, length: usize) -> bool {
        snapshot(&self.stopwords)
            .match_range(chars, begin, length)
            .is_match()
    }

    /// Batch-add words to the main trie.
    pub fn add_words<I, S>(&self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        insert_all(&self.main, words);
    }

    /// Batch-disable words in the main trie. Disabled words stop reporting
    /// MATCH but their nodes stay in place for longer words.
    pub fn disable_words<I, S>(&self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut slot = lock_write(&self.main);
        let trie = Arc::make_mut(&mut slot);
        for word in words {
            if let Some(normalized) = normalize_word(word.as_ref()) {
                trie.disable(&normalized);
            }
        }
    }

    pub(crate) fn merge_records(&self, target: DictTarget, records: &[WordRecord]) {
        let slot = match target {
            DictTarget::Main => &self.main,
            DictTarget::Stopwords => &self.stopwords,
        };
        insert_all(slot, records.iter().map(|r| r.text.as_str()));
    }

    /// Rebuild the main and stop-word tries from their full load sequence and
    /// swap them in. Matching against the old tries continues undisturbed;
    /// outstanding hits keep the detached tries alive.
    pub async fn reload_main(&self) {
        tracing::info!("reloading main and stop-word dictionaries");
        let main = build_main_trie(&self.config, &self.remote).await;
        let stopwords = build_stop_trie(&self.config, &self.remote).await;
        *lock_write(&self.main) = Arc::new(main);
        *lock_write(&self.stopwords) = Arc::new(stopwords);
        tracing::info!("dictionary reload complete");
    }

    /// One remote-channel cycle: re-fetch every configured URL in full and
    /// merge. A failing URL is logged and skipped; the rest still merge.
    pub(crate) async fn refresh_remote_once(&self) {
        for url in &self.config.remote_ext_dict {
            self.fetch_remote_into(url, &self.main).await;
        }
        for url in &self.config.remote_ext_stopwords {
            self.fetch_remote_into(url, &self.stopwords).await;
        }
    }

    async fn fetch_remote_into(&self, url: &str, slot: &RwLock<Arc<WordTrie>>) {
        match self.remote.fetch(url).await {
            Ok(records) => {
                tracing::info!(url, count = records.len(), "merged remote word list");
                insert_all(slot, records.iter().map(|r| r.text.as_str()));
            }
            Err(error) => {
                tracing::error!(%error, url, "remote word list fetch failed");
            }
        }
    }

    pub(crate) fn config(&self) -> &DictionaryConfig {
        &self.config
    }

    /// Enabled word count per trie, in load order. Used by logs and tests.
    pub fn word_counts(&self) -> [usize; 6] {
        [
            snapshot(&self.main).len(),
            snapshot(&self.surname).len(),
            snapshot(&self.quantifier).len(),
            snapshot(&self.suffix).len(),
            snapshot(&self.preposition).len(),
            snapshot(&self.stopwords).len(),
        ]
    }
}

fn snapshot(slot: &RwLock<Arc<WordTrie>>) -> Arc<WordTrie> {
    slot.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn lock_write(slot: &RwLock<Arc<WordTrie>>) -> std::sync::RwLockWriteGuard<'_, Arc<WordTrie>> {
    slot.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn insert_all<I, S>(slot: &RwLock<Arc<WordTrie>>, words: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut guard = lock_write(slot);
    let trie = Arc::make_mut(&mut guard);
    for word in words {
        if let Some(normalized) = normalize_word(word.as_ref()) {
            trie.insert(&normalized);
        }
    }
}

/// Main trie: optional base file, then local extension files, then remote
/// lists. Every source failure is contained to that source.
async fn build_main_trie(config: &DictionaryConfig, remote: &RemoteWordSource) -> WordTrie {
    let mut trie = WordTrie::new();
    load_optional_file(&mut trie, &config.base_dict_path(MAIN_DICT_FILE), "main");
    if let Some(list) = &config.ext_dict {
        load_extension_files(&mut trie, &config.dict_root, list);
    }
    load_remote_lists(&mut trie, remote, &config.remote_ext_dict).await;
    tracing::info!(words = trie.len(), "main dictionary loaded");
    trie
}

/// Stop-word trie: same base/extension/remote sequence as main.
async fn build_stop_trie(config: &DictionaryConfig, remote: &RemoteWordSource) -> WordTrie {
    let mut trie = WordTrie::new();
    load_optional_file(
        &mut trie,
        &config.base_dict_path(STOPWORD_DICT_FILE),
        "stopword",
    );
    if let Some(list) = &config.ext_stopwords {
        load_extension_files(&mut trie, &config.dict_root, list);
    }
    load_remote_lists(&mut trie, remote, &config.remote_ext_stopwords).await;
    tracing::info!(words = trie.len(), "stop-word dictionary loaded");
    trie
}

fn load_mandatory_trie(
    config: &DictionaryConfig,
    file: &str,
    name: &'static str,
) -> Result<WordTrie, DictError> {
    let path = config.base_dict_path(file);
    let mut trie = WordTrie::new();
    match read_dict_file(&path) {
        Ok(records) => {
            fill_trie(&mut trie, &records);
            tracing::info!(words = trie.len(), dict = name, "dictionary loaded");
            Ok(trie)
        }
        Err(source) => Err(DictError::MandatoryDictMissing { name, path, source }),
    }
}

fn load_optional_file(trie: &mut WordTrie, path: &Path, name: &str) {
    match read_dict_file(path) {
        Ok(records) => fill_trie(trie, &records),
        Err(error) => {
            tracing::warn!(%error, dict = name, path = %path.display(), "optional base dictionary missing; starting empty");
        }
    }
}

fn load_extension_files(trie: &mut WordTrie, root: &Path, list: &str) {
    for path in expand_dict_paths(root, list) {
        match read_dict_file(&path) {
            Ok(records) => {
                tracing::info!(path = %path.display(), count = records.len(), "extension dictionary loaded");
                fill_trie(trie, &records);
            }
            Err(error) => {
                tracing::error!(%error, path = %path.display(), "extension dictionary load failed");
            }
        }
    }
}

async fn load_remote_lists(trie: &mut WordTrie, remote: &RemoteWordSource, urls: &[String]) {
    for url in urls {
        match remote.fetch(url).await {
            Ok(records) => {
                tracing::info!(url, count = records.len(), "remote word list loaded");
                fill_trie(trie, &records);
            }
            Err(error) => {
                tracing::error!(%error, url, "remote word list load failed");
            }
        }
    }
}

fn fill_trie(trie: &mut WordTrie, records: &[WordRecord]) {
    for record in records {
        trie.insert(&record.text);
    }
}
