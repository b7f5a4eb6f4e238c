//! ステータスコードとリーズンフレーズの対応表

use std::collections::HashMap;

/// ステータスコード → リーズンフレーズの対応表
///
/// 起動時に `register()` で構築し、以降は `&StatusRegistry` や
/// `Arc<StatusRegistry>` で読み取り専用として共有する。
/// 未登録のコードに対する代替フレーズは持たない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRegistry {
    reasons: HashMap<u16, String>,
}

impl Default for StatusRegistry {
    /// 200 / 201 / 204 と、エラーレスポンス用の 400 / 500 を登録した表
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(200, "OK");
        registry.register(201, "Created");
        registry.register(204, "No Content");
        registry.register(400, "Bad Request");
        registry.register(500, "Internal Server Error");
        registry
    }
}

impl StatusRegistry {
    /// 空の対応表を作成
    pub fn new() -> Self {
        Self {
            reasons: HashMap::new(),
        }
    }

    /// リーズンフレーズを登録 (既存のものは上書き)
    pub fn register(&mut self, code: u16, reason: &str) {
        self.reasons.insert(code, reason.to_string());
    }

    /// リーズンフレーズを登録 (ビルダーパターン)
    pub fn with(mut self, code: u16, reason: &str) -> Self {
        self.register(code, reason);
        self
    }

    /// リーズンフレーズを取得
    pub fn lookup(&self, code: u16) -> Option<&str> {
        self.reasons.get(&code).map(|r| r.as_str())
    }

    /// 登録済みか確認
    pub fn contains(&self, code: u16) -> bool {
        self.reasons.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    /// コード順に列挙
    pub fn iter(&self) -> impl Iterator<Item = (u16, &str)> {
        let mut entries: Vec<_> = self
            .reasons
            .iter()
            .map(|(code, reason)| (*code, reason.as_str()))
            .collect();
        entries.sort_by_key(|(code, _)| *code);
        entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_entries() {
        let registry = StatusRegistry::default();
        assert_eq!(registry.lookup(200), Some("OK"));
        assert_eq!(registry.lookup(201), Some("Created"));
        assert_eq!(registry.lookup(204), Some("No Content"));
        assert_eq!(registry.lookup(400), Some("Bad Request"));
        assert_eq!(registry.lookup(500), Some("Internal Server Error"));
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn lookup_unregistered() {
        let registry = StatusRegistry::default();
        assert_eq!(registry.lookup(418), None);
        assert!(!registry.contains(418));
        assert_eq!(StatusRegistry::new().lookup(200), None);
    }

    #[test]
    fn register_overwrites() {
        let mut registry = StatusRegistry::new();
        registry.register(200, "Fine");
        registry.register(200, "OK");
        assert_eq!(registry.lookup(200), Some("OK"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn no_modulo_collision() {
        // 200 と 712 は 512 で割った余りが同じ
        let registry = StatusRegistry::new().with(200, "OK").with(712, "Other");
        assert_eq!(registry.lookup(200), Some("OK"));
        assert_eq!(registry.lookup(712), Some("Other"));
    }

    #[test]
    fn iter_sorted() {
        let registry = StatusRegistry::new()
            .with(204, "No Content")
            .with(200, "OK")
            .with(201, "Created");
        let codes: Vec<u16> = registry.iter().map(|(code, _)| code).collect();
        assert_eq!(codes, vec![200, 201, 204]);
    }
}
