//! 测试用的验证服务与接收端替身，记录调用并按脚本返回结果。

use crate::error::AppResult;
use crate::external::{DeliveryOutcome, IntakeSink, ProviderReply, VerificationProvider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Start(String),
    Check(String, String),
}

pub fn pending() -> ProviderReply {
    ProviderReply {
        http_success: true,
        status: Some("pending".to_string()),
        message: None,
    }
}

pub fn approved() -> ProviderReply {
    ProviderReply {
        http_success: true,
        status: Some("approved".to_string()),
        message: None,
    }
}

pub fn rejected(message: &str) -> ProviderReply {
    ProviderReply {
        http_success: false,
        status: None,
        message: Some(message.to_string()),
    }
}

/// 队列为空时发码返回 pending、校验返回 approved
pub struct FakeProvider {
    configured: bool,
    start_replies: Mutex<VecDeque<AppResult<ProviderReply>>>,
    check_replies: Mutex<VecDeque<AppResult<ProviderReply>>>,
    calls: Mutex<Vec<ProviderCall>>,
    gate: Option<Arc<Notify>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            configured: true,
            start_replies: Mutex::new(VecDeque::new()),
            check_replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    /// 每次调用记录后都要等 `gate` 放行才返回
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }

    pub fn push_start(&self, reply: AppResult<ProviderReply>) {
        self.start_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_check(&self, reply: AppResult<ProviderReply>) {
        self.check_replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn wait_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl VerificationProvider for FakeProvider {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn start_verification(&self, to: &str) -> AppResult<ProviderReply> {
        self.calls
            .lock()
            .unwrap()
            .push(ProviderCall::Start(to.to_string()));
        self.wait_gate().await;
        let scripted = self.start_replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(pending()))
    }

    async fn check_verification(&self, to: &str, code: &str) -> AppResult<ProviderReply> {
        self.calls
            .lock()
            .unwrap()
            .push(ProviderCall::Check(to.to_string(), code.to_string()));
        self.wait_gate().await;
        let scripted = self.check_replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(approved()))
    }
}

/// 队列为空时返回 `Dispatched`
pub struct FakeSink {
    configured: bool,
    outcomes: Mutex<VecDeque<AppResult<DeliveryOutcome>>>,
    deliveries: Mutex<Vec<Vec<(&'static str, String)>>>,
}

impl FakeSink {
    pub fn new() -> Self {
        Self {
            configured: true,
            outcomes: Mutex::new(VecDeque::new()),
            deliveries: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn push_outcome(&self, outcome: AppResult<DeliveryOutcome>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn deliveries(&self) -> Vec<Vec<(&'static str, String)>> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl IntakeSink for FakeSink {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn deliver(&self, fields: &[(&'static str, String)]) -> AppResult<DeliveryOutcome> {
        self.deliveries.lock().unwrap().push(fields.to_vec());
        let scripted = self.outcomes.lock().unwrap().pop_front();
        scripted.unwrap_or(Ok(DeliveryOutcome::Dispatched))
    }
}
