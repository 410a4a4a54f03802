use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
        }
    }
}

pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(opts: &BrowserOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .window_size(opts.window_width, opts.window_height);
        if !opts.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(|e| anyhow!(e))?;

        let (browser, mut handler) = Browser::launch(config).await.context(
            "ブラウザを起動できませんでした（Chrome/Chromium がインストールされているか確認してください）",
        )?;
        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("新しいページを開けませんでした")?;

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("ページへ移動できませんでした: {url}"))?;
        Ok(())
    }

    pub async fn exec(&self, script: &str) -> Result<()> {
        self.page
            .evaluate(script)
            .await
            .context("スクリプトを実行できませんでした")?;
        Ok(())
    }

    pub async fn evaluate<T>(&self, expression: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let result = self
            .page
            .evaluate(expression)
            .await
            .context("スクリプトを実行できませんでした")?;
        Ok(result.into_value()?)
    }

    pub async fn evaluate_async(&self, expression: &str) -> Result<serde_json::Value> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(|e| anyhow!(e))?;
        let result = self
            .page
            .evaluate(params)
            .await
            .context("スクリプトを実行できませんでした")?;
        Ok(result.into_value()?)
    }

    pub async fn poll_until(&self, predicate: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let satisfied: bool = self.evaluate(predicate).await.unwrap_or(false);
            if satisfied {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn shutdown(mut self) {
        let _ = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}
