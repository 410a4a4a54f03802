use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub struct NavigationError {
    pub url: String,
    pub timeout: Duration,
}

impl NavigationError {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ページの読み込みが完了しませんでした: {}（タイムアウト: {}秒）",
            self.url,
            self.timeout.as_secs()
        )
    }
}

impl std::error::Error for NavigationError {}

#[derive(Debug)]
pub struct InjectionError {
    pub url: String,
    pub timeout: Duration,
}

impl InjectionError {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl fmt::Display for InjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "axe-core を読み込めませんでした: {}（タイムアウト: {}秒）",
            self.url,
            self.timeout.as_secs()
        )
    }
}

impl std::error::Error for InjectionError {}

#[derive(Debug)]
pub struct AuditError {
    pub url: String,
    pub cause: anyhow::Error,
}

impl AuditError {
    pub fn new(url: impl Into<String>, cause: anyhow::Error) -> Self {
        Self {
            url: url.into(),
            cause,
        }
    }
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "監査中にエラーが発生しました: {}", self.url)
    }
}

impl std::error::Error for AuditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

#[derive(Debug)]
pub struct SchemaError {
    pub message: String,
}

impl SchemaError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "監査レコードの形式が不正です: {}", self.message)
    }
}

impl std::error::Error for SchemaError {}
