use std::collections::BTreeMap;
use std::sync::Arc;

const ROOT: usize = 0;

/// One trie node: its character, ordered child links, terminal flags, and a
/// count of enabled words in its subtree.
#[derive(Debug, Clone)]
struct TrieNode {
    ch: char,
    children: BTreeMap<char, u32>,
    word_end: bool,
    disabled: bool,
    enabled_below: u32,
}

impl TrieNode {
    fn new(ch: char) -> Self {
        Self {
            ch,
            children: BTreeMap::new(),
            word_end: false,
            disabled: false,
            enabled_below: 0,
        }
    }

    fn is_enabled_word(&self) -> bool {
        self.word_end && !self.disabled
    }
}

/// Character trie for exact and prefix multi-pattern matching.
///
/// Nodes live in an arena `Vec`; a `Hit` resumes from a node index plus an
/// `Arc` of the trie, so a trie swapped out by a reload stays alive for as
/// long as any outstanding continuation references it.
///
/// The trie itself has no interior mutability. Writers mutate through
/// `Arc::make_mut` behind the owning slot, which copies only when a reader
/// still holds the previous `Arc` -- an in-flight traversal always sees the
/// structure it started on.
#[derive(Debug, Clone)]
pub struct WordTrie {
    nodes: Vec<TrieNode>,
}

impl Default for WordTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl WordTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::new('\0')],
        }
    }

    /// Number of enabled words in the trie.
    pub fn len(&self) -> usize {
        self.nodes[ROOT].enabled_below as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a word, creating nodes as needed. Idempotent; re-inserting a
    /// disabled word re-enables it.
    pub fn insert(&mut self, word: &str) {
        let mut path = vec![ROOT];
        let mut node = ROOT;
        for ch in word.chars() {
            node = self.child_or_insert(node, ch);
            path.push(node);
        }
        if path.len() == 1 {
            return;
        }
        let terminal = &mut self.nodes[node];
        if terminal.is_enabled_word() {
            return;
        }
        terminal.word_end = true;
        terminal.disabled = false;
        for idx in path {
            self.nodes[idx].enabled_below += 1;
        }
    }

    /// Soft-remove a word: its terminal node is flagged disabled but never
    /// freed, so longer words sharing the prefix keep matching.
    pub fn disable(&mut self, word: &str) {
        let mut path = vec![ROOT];
        let mut node = ROOT;
        for ch in word.chars() {
            match self.nodes[node].children.get(&ch) {
                Some(&next) => {
                    node = next as usize;
                    path.push(node);
                }
                None => return,
            }
        }
        if path.len() == 1 || !self.nodes[node].is_enabled_word() {
            return;
        }
        self.nodes[node].disabled = true;
        for idx in path {
            self.nodes[idx].enabled_below -= 1;
        }
    }

    /// Exact-membership test for an enabled word.
    pub fn contains(&self, word: &str) -> bool {
        let mut node = ROOT;
        for ch in word.chars() {
            match self.nodes[node].children.get(&ch) {
                Some(&next) => node = next as usize,
                None => return false,
            }
        }
        node != ROOT && self.nodes[node].is_enabled_word()
    }

    /// Match `length` characters of `chars` starting at `begin`, walking from
    /// the root. Never fails: an absent path yields an unmatched `Hit`.
    pub fn match_range(self: &Arc<Self>, chars: &[char], begin: usize, length: usize) -> Hit {
        self.match_from(chars, begin, length, ROOT, begin)
    }

    fn match_from(
        self: &Arc<Self>,
        chars: &[char],
        begin: usize,
        length: usize,
        start: usize,
        hit_begin: usize,
    ) -> Hit {
        let Some(end) = begin.checked_add(length) else {
            return Hit::unmatched_at(hit_begin, begin);
        };
        if length == 0 || end > chars.len() {
            return Hit::unmatched_at(hit_begin, begin);
        }

        let mut node = start;
        for &ch in &chars[begin..end] {
            match self.nodes[node].children.get(&ch) {
                Some(&next) => node = next as usize,
                None => return Hit::unmatched_at(hit_begin, end - 1),
            }
        }

        let reached = &self.nodes[node];
        let is_match = reached.is_enabled_word();
        // Continuation potential counts only enabled words strictly below the
        // node; a fully disabled subtree does not report PREFIX.
        let below = reached.enabled_below - is_match as u32;
        Hit {
            begin: hit_begin,
            end: end - 1,
            is_match,
            is_prefix: below > 0,
            cursor: Some(Cursor {
                trie: Arc::clone(self),
                node: node as u32,
            }),
        }
    }

    fn child_or_insert(&mut self, parent: usize, ch: char) -> usize {
        if let Some(&idx) = self.nodes[parent].children.get(&ch) {
            return idx as usize;
        }
        let idx = self.nodes.len();
        self.nodes.push(TrieNode::new(ch));
        self.nodes[parent].children.insert(ch, idx as u32);
        idx
    }
}

#[derive(Debug, Clone)]
struct Cursor {
    trie: Arc<WordTrie>,
    node: u32,
}

/// Result of a match attempt. MATCH and PREFIX are independent flags; a hit
/// that completed its walk carries a cursor for resuming at the next
/// character without re-walking from the root.
#[derive(Debug, Clone)]
pub struct Hit {
    begin: usize,
    end: usize,
    is_match: bool,
    is_prefix: bool,
    cursor: Option<Cursor>,
}

impl Hit {
    pub fn unmatched() -> Self {
        Self::unmatched_at(0, 0)
    }

    /// Failed attempt over a known window; begin/end survive so the caller
    /// can still attribute the miss to the characters it covered.
    fn unmatched_at(begin: usize, end: usize) -> Self {
        Self {
            begin,
            end,
            is_match: false,
            is_prefix: false,
            cursor: None,
        }
    }

    /// The matched word ends at the current position.
    pub fn is_match(&self) -> bool {
        self.is_match
    }

    /// At least one enabled word continues past the current position.
    pub fn is_prefix(&self) -> bool {
        self.is_prefix
    }

    pub fn is_unmatch(&self) -> bool {
        !self.is_match && !self.is_prefix
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Consume one more character, resuming from this hit's trie position.
    /// The walk continues against the trie the hit was produced from, even if
    /// the live dictionary has since been swapped.
    pub fn advance(&self, chars: &[char], index: usize) -> Hit {
        match &self.cursor {
            Some(cursor) => {
                cursor
                    .trie
                    .match_from(chars, index, 1, cursor.node as usize, self.begin)
            }
            None => Hit::unmatched_at(self.begin, self.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars_of(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    fn trie_with(words: &[&str]) -> Arc<WordTrie> {
        let mut trie = WordTrie::new();
        for word in words {
            trie.insert(word);
        }
        Arc::new(trie)
    }

    #[test]
    fn exact_words_match_and_strict_prefixes_report_prefix() {
        let trie = trie_with(&["北京", "北京大学", "大学"]);
        let chars = chars_of("北京大学");

        let hit = trie.match_range(&chars, 0, 2);
        assert!(hit.is_match(), "北京 should be an exact match");
        assert!(hit.is_prefix(), "北京 is also a prefix of 北京大学");

        let hit = trie.match_range(&chars, 0, 1);
        assert!(!hit.is_match(), "北 alone is not a word");
        assert!(hit.is_prefix(), "北 is a strict prefix");

        let hit = trie.match_range(&chars, 0, 4);
        assert!(hit.is_match(), "北京大学 should be an exact match");
        assert!(!hit.is_prefix(), "nothing extends past 北京大学");
        assert_eq!((hit.begin(), hit.end()), (0, 3));

        let hit = trie.match_range(&chars, 2, 2);
        assert!(hit.is_match(), "大学 should match from offset 2");
    }

    #[test]
    fn missing_path_is_unmatch_not_error() {
        let trie = trie_with(&["北京"]);
        let chars = chars_of("上海");
        let hit = trie.match_range(&chars, 0, 2);
        assert!(hit.is_unmatch());
        assert!(hit.advance(&chars, 0).is_unmatch(), "unmatched hits cannot resume");
    }

    #[test]
    fn unmatched_hit_keeps_window_offsets() {
        let trie = trie_with(&["北京", "大学"]);
        let chars = chars_of("北京上海大学");

        let hit = trie.match_range(&chars, 2, 2);
        assert!(hit.is_unmatch());
        assert_eq!((hit.begin(), hit.end()), (2, 3), "miss still names its window");

        // A continuation that fails keeps the begin it started from.
        let hit = trie.match_range(&chars, 0, 1).advance(&chars, 2);
        assert!(hit.is_unmatch());
        assert_eq!(hit.begin(), 0);
        assert_eq!(hit.end(), 2);
    }

    #[test]
    fn out_of_range_window_is_unmatch() {
        let trie = trie_with(&["北京"]);
        let chars = chars_of("北京");
        assert!(trie.match_range(&chars, 0, 3).is_unmatch());
        assert!(trie.match_range(&chars, 0, 0).is_unmatch());
        assert!(trie.match_range(&chars, usize::MAX, 2).is_unmatch());
    }

    #[test]
    fn disable_hides_word_but_keeps_longer_words() {
        let mut trie = WordTrie::new();
        trie.insert("北京");
        trie.insert("北京大学");
        trie.disable("北京");
        let trie = Arc::new(trie);
        let chars = chars_of("北京大学");

        let hit = trie.match_range(&chars, 0, 2);
        assert!(!hit.is_match(), "disabled word must not report MATCH");
        assert!(hit.is_prefix(), "北京大学 still continues through the prefix");
        assert!(trie.match_range(&chars, 0, 4).is_match());
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn disabling_sole_word_removes_prefix_potential() {
        let mut trie = WordTrie::new();
        trie.insert("北京");
        trie.disable("北京");
        let trie = Arc::new(trie);
        let chars = chars_of("北京");

        let hit = trie.match_range(&chars, 0, 1);
        assert!(
            !hit.is_prefix(),
            "a prefix leading only to disabled words has no continuation potential"
        );
        assert!(trie.match_range(&chars, 0, 2).is_unmatch());
    }

    #[test]
    fn reinsert_after_disable_reenables() {
        let mut trie = WordTrie::new();
        trie.insert("的");
        trie.disable("的");
        assert!(!trie.contains("的"));
        trie.insert("的");
        assert!(trie.contains("的"));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut trie = WordTrie::new();
        trie.insert("中国");
        trie.insert("中国");
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn empty_word_and_unknown_disable_are_noops() {
        let mut trie = WordTrie::new();
        trie.insert("");
        assert!(trie.is_empty());
        trie.disable("不存在");
        trie.insert("中国");
        trie.disable("中");
        assert_eq!(trie.len(), 1);
        assert!(trie.contains("中国"));
    }

    #[test]
    fn chained_single_char_advances_equal_one_call() {
        let trie = trie_with(&["北京", "北京大学", "大学生", "中"]);
        for text in ["北京大学", "大学生", "中大", "北大", "长江"] {
            let chars = chars_of(text);
            let whole = trie.match_range(&chars, 0, chars.len());

            let mut chained = trie.match_range(&chars, 0, 1);
            for i in 1..chars.len() {
                chained = chained.advance(&chars, i);
            }

            assert_eq!(
                (whole.is_match(), whole.is_prefix()),
                (chained.is_match(), chained.is_prefix()),
                "chained continuation diverged from single call for {text}"
            );
        }
    }

    #[test]
    fn advance_keeps_begin_and_tracks_end() {
        let trie = trie_with(&["北京大学"]);
        let chars = chars_of("北京大学");
        let mut hit = trie.match_range(&chars, 0, 2);
        hit = hit.advance(&chars, 2);
        hit = hit.advance(&chars, 3);
        assert!(hit.is_match());
        assert_eq!((hit.begin(), hit.end()), (0, 3));
    }

    #[test]
    fn hit_outlives_swapped_trie() {
        let trie = trie_with(&["北京大学"]);
        let chars = chars_of("北京大学");
        let hit = trie.match_range(&chars, 0, 2);
        drop(trie);
        // The cursor's Arc keeps the detached trie alive.
        let hit = hit.advance(&chars, 2).advance(&chars, 3);
        assert!(hit.is_match());
    }
}
