//! Request and response bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_cost_per_minute() -> f64 {
    0.15
}

fn default_routing_tier() -> String {
    "standard".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: UserInfo,
    pub tenant: TenantSummary,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserInfo {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: String,
    #[serde(default)]
    pub login_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TenantSummary {
    pub tenant_id: String,
    pub organization_name: String,
    pub subdomain: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tenant {
    pub tenant_id: String,
    pub organization_name: String,
    pub subdomain: String,
    pub plan_tier: String,
    pub is_active: bool,
    pub created_at: String,
}

/// Per-agent totals shown in agent lists.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AgentStats {
    pub total_calls: u64,
    pub total_minutes: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentSummary {
    pub agent_id: String,
    pub agent_name: String,
    #[serde(default)]
    pub agent_description: Option<String>,
    pub language_primary: String,
    #[serde(default)]
    pub language_secondary: Option<String>,
    /// Co-pilot endpoint for this agent, when it has its own.
    #[serde(default)]
    pub websocket_url: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default = "default_cost_per_minute")]
    pub cost_per_minute: f64,
    #[serde(default = "default_routing_tier")]
    pub routing_tier: String,
    #[serde(default)]
    pub stats: Option<AgentStats>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentDetail {
    pub agent_id: String,
    pub agent_name: String,
    #[serde(default)]
    pub agent_description: Option<String>,
    pub language_primary: String,
    #[serde(default)]
    pub language_secondary: Option<String>,
    #[serde(default)]
    pub websocket_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub configuration: Value,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default = "default_cost_per_minute")]
    pub cost_per_minute: f64,
    #[serde(default = "default_routing_tier")]
    pub routing_tier: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Analytics {
    pub total_calls_today: u64,
    pub total_minutes_today: u64,
    pub total_cost_today: f64,
    pub success_rate: f64,
    pub avg_call_duration: u64,
    pub active_calls: u64,
    #[serde(default)]
    pub call_volume_trend: Vec<Value>,
    #[serde(default)]
    pub cost_breakdown: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallLog {
    pub call_id: String,
    pub duration_display: String,
    pub cost_euros: f64,
    pub status: String,
    pub start_time: String,
    pub sentiment_score: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Wallet {
    pub balance_euros: f64,
    pub currency: String,
    pub estimated_calls_remaining: u64,
    pub balance_status: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount_euros: f64,
    pub description: String,
    pub created_at: String,
}
