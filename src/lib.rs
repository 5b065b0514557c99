mod config;
mod error;
mod loader;
mod manager;
mod refresh;
mod trie;

pub use config::{
    DbConfig, DictionaryConfig, MAIN_DICT_FILE, PREPOSITION_DICT_FILE, QUANTIFIER_DICT_FILE,
    STOPWORD_DICT_FILE, SUFFIX_DICT_FILE, SURNAME_DICT_FILE,
};
pub use error::DictError;
pub use loader::{normalize_word, DbWordSource, RemoteWordSource, WordRecord};
pub use manager::DictionaryManager;
pub use refresh::RefreshScheduler;
pub use trie::{Hit, WordTrie};
