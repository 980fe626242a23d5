use chrono::Utc;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::model::ReportState;
use crate::notifier::{DeliveryError, Notifier};
use crate::practicum::{ApiError, HomeworkApi};
use crate::response::{check_response, ResponseError};
use crate::status::{parse_status, StatusError};

/// Any failure inside one poll cycle. All of them are recovered by [`Poller::tick`].
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Response(#[from] ResponseError),
    #[error(transparent)]
    Status(#[from] StatusError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

pub fn no_homework_message(cursor: i64) -> String {
    format!("Нет новых статусов домашних работ с {}", cursor)
}

pub fn malfunction_message(err: &CycleError) -> String {
    format!("Сбой в работе программы: {}", err)
}

pub struct Poller<A, N> {
    api: A,
    notifier: N,
    interval: Duration,
    cursor: i64,
    report: ReportState,
    last_report: ReportState,
}

impl<A: HomeworkApi, N: Notifier> Poller<A, N> {
    pub fn new(api: A, notifier: N, interval: Duration) -> Self {
        Self::with_cursor(api, notifier, interval, Utc::now().timestamp())
    }

    pub fn with_cursor(api: A, notifier: N, interval: Duration, cursor: i64) -> Self {
        Self {
            api,
            notifier,
            interval,
            cursor,
            report: ReportState::default(),
            last_report: ReportState::default(),
        }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Last report that was delivered to the chat.
    pub fn last_report(&self) -> &ReportState {
        &self.last_report
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// One fetch → validate → format → compare → notify pass.
    #[instrument(skip_all, fields(cursor = self.cursor))]
    pub async fn run_cycle(&mut self) -> Result<(), CycleError> {
        let response = self.api.fetch(self.cursor).await?;
        if let Some(current_date) = response.get("current_date").and_then(Value::as_i64) {
            self.cursor = current_date;
        }

        let homeworks = check_response(&response)?;
        match homeworks.first() {
            Some(homework) => {
                let output = parse_status(homework)?;
                self.report.name = homework
                    .get("homework_name")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                self.report.output = output;
            }
            None => {
                self.report.output = no_homework_message(self.cursor);
            }
        }

        if self.report == self.last_report {
            debug!("report unchanged; nothing to send");
            return Ok(());
        }

        self.notifier.notify(&self.report.output).await?;
        self.last_report = self.report.clone();
        info!(cursor = self.cursor, "report delivered");
        Ok(())
    }

    /// Run one cycle and turn any failure into a best-effort alert.
    pub async fn tick(&mut self) {
        let err = match self.run_cycle().await {
            Ok(()) => return,
            Err(err) => err,
        };
        error!(?err, cursor = self.cursor, "poll cycle failed");

        self.report.output = malfunction_message(&err);
        if self.report == self.last_report {
            debug!("failure already reported");
            return;
        }
        match self.notifier.notify(&self.report.output).await {
            Ok(()) => self.last_report = self.report.clone(),
            Err(alert_err) => warn!(?alert_err, "failed to deliver failure alert"),
        }
    }

    /// Poll forever, sleeping `interval` after every cycle.
    pub async fn run(&mut self) {
        info!(
            interval_secs = self.interval.as_secs(),
            cursor = self.cursor,
            "starting poll loop"
        );
        loop {
            self.tick().await;
            tokio::time::sleep(self.interval).await;
        }
    }
}
