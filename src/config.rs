use crate::error::Error;

/// 終端失敗時の振る舞い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// 何も送らずに接続を閉じる
    ///
    /// クライアントからは接続が閉じられたことしか見えない。
    #[default]
    SilentDrop,
    /// 最小限のエラーレスポンスを送ってから接続を閉じる
    ///
    /// 不正なリクエストには 400、エンコード失敗には 500 を返す。
    /// どちらもレジストリに登録されている場合に限る。
    ErrorResponse,
}

/// 処理設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// リクエストとして読み込む最大バイト数 (区切りを含む、デフォルト: 8192)
    ///
    /// 実際にバッファに溜めるのは `max_request_size - 1` バイトまで。
    pub max_request_size: usize,
    /// エンコード後のレスポンスの上限 (デフォルト: 8192)
    ///
    /// この値以上のレスポンスは送信しない。
    pub max_response_size: usize,
    /// 終端失敗時の振る舞い (デフォルト: SilentDrop)
    pub failure_policy: FailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_request_size: 8 * 1024,
            max_response_size: 8 * 1024,
            failure_policy: FailurePolicy::SilentDrop,
        }
    }
}

impl Config {
    /// 失敗時にエラーレスポンスを返すよう設定 (ビルダーパターン)
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// 設定値を検証
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_request_size == 0 {
            return Err(Error::InvalidConfig(
                "max_request_size must be positive".to_string(),
            ));
        }
        if self.max_response_size == 0 {
            return Err(Error::InvalidConfig(
                "max_response_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
