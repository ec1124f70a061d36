//! The catalogue of Solana RPC tools exposed over MCP.
//!
//! Every tool follows the same shape: deserialize typed arguments, lay them
//! out as positional JSON-RPC params, POST one envelope upstream and hand
//! the decoded body back untouched. A failed round trip becomes
//! `{"error": "<message>"}` instead of an error, so callers always receive
//! data.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use solrpc_core::traits::RpcTransport;
use solrpc_core::types::{HttpMethod, RpcRequest};

/// Program id of the SPL Token program.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Definition of an MCP tool as advertised by `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Errors raised before any request leaves the process.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for '{tool}': {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

type ParamBuilder = fn(Value) -> Result<Vec<Value>, serde_json::Error>;

/// One registered tool: its advertised definition plus the upstream method
/// it forwards to.
#[derive(Debug, Clone)]
pub struct Tool {
    definition: ToolDefinition,
    rpc_method: &'static str,
    failure_message: &'static str,
    build_params: ParamBuilder,
}

impl Tool {
    fn new(
        name: &str,
        description: &str,
        input_schema: Value,
        rpc_method: &'static str,
        failure_message: &'static str,
        build_params: ParamBuilder,
    ) -> Self {
        Self {
            definition: ToolDefinition {
                name: name.to_string(),
                description: description.to_string(),
                input_schema,
            },
            rpc_method,
            failure_message,
            build_params,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    #[must_use]
    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    /// The Solana JSON-RPC method this tool calls.
    #[must_use]
    pub fn rpc_method(&self) -> &'static str {
        self.rpc_method
    }

    /// Message returned in `{"error": ...}` when the round trip fails.
    #[must_use]
    pub fn failure_message(&self) -> &'static str {
        self.failure_message
    }

    /// Build the outbound envelope without sending it.
    ///
    /// A `null` argument value is treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] when the arguments do not
    /// match the tool's parameter types.
    pub fn build_request(&self, args: Value) -> Result<RpcRequest, ToolError> {
        let args = if args.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            args
        };

        let params = (self.build_params)(args).map_err(|source| ToolError::InvalidArguments {
            tool: self.definition.name.clone(),
            source,
        })?;

        Ok(RpcRequest::new(self.rpc_method, params))
    }

    /// Run the tool: one POST upstream, body passed through as-is.
    ///
    /// An upstream JSON-RPC `error` member is not inspected; it reaches the
    /// caller exactly like a `result` would.
    ///
    /// # Errors
    ///
    /// Only argument errors are returned. Transport failures become an
    /// `{"error": ...}` value.
    pub async fn call(
        &self,
        transport: &dyn RpcTransport,
        args: Value,
    ) -> Result<Value, ToolError> {
        let request = self.build_request(args)?;
        tracing::debug!("Tool '{}' calling {}", self.name(), self.rpc_method);

        let payload = request.to_value();
        match transport.send(HttpMethod::Post, Some(&payload)).await {
            Some(body) => Ok(body),
            None => Ok(json!({ "error": self.failure_message })),
        }
    }
}

/// Immutable table of every tool the server exposes, built once at startup.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    /// The Solana account, block and cluster queries.
    #[must_use]
    pub fn solana() -> Self {
        let tools = vec![
            Tool::new(
                "get_account_info",
                "Get information about a Solana account",
                object_schema(
                    json!({ "address": string_prop("Base58 address of the account") }),
                    &["address"],
                ),
                "getAccountInfo",
                "Failed to fetch account information",
                account_info_params,
            ),
            Tool::new(
                "get_account_balance",
                "Get the balance of a Solana account",
                object_schema(
                    json!({ "address": string_prop("Base58 address of the account") }),
                    &["address"],
                ),
                "getBalance",
                "Failed to fetch account balance",
                address_params,
            ),
            Tool::new(
                "get_program_accounts",
                "Query all accounts owned by a program, such as token accounts, NFT data or program state",
                object_schema(
                    json!({ "program_id": string_prop("Base58 program id") }),
                    &["program_id"],
                ),
                "getProgramAccounts",
                "Failed to fetch program accounts",
                program_params,
            ),
            Tool::new(
                "get_token_account_balance",
                "Get the token balance of an SPL token account",
                object_schema(
                    json!({ "token_account": string_prop("Base58 address of the token account") }),
                    &["token_account"],
                ),
                "getTokenAccountBalance",
                "Failed to fetch token account balance",
                token_account_params,
            ),
            Tool::new(
                "get_token_accounts_by_owner",
                "Get all SPL token accounts held by an owner",
                object_schema(
                    json!({ "owner": string_prop("Base58 address of the owner") }),
                    &["owner"],
                ),
                "getTokenAccountsByOwner",
                "Failed to fetch token accounts",
                owner_params,
            ),
            Tool::new(
                "get_blocks",
                "Get the confirmed blocks between two slots",
                object_schema(
                    json!({
                        "start_slot": integer_prop("First slot of the range"),
                        "end_slot": integer_prop("Last slot of the range; defaults to the latest slot"),
                    }),
                    &["start_slot"],
                ),
                "getBlocks",
                "Failed to fetch blocks",
                blocks_params,
            ),
            Tool::new(
                "get_epoch_schedule",
                "Get the epoch schedule of the cluster",
                object_schema(json!({}), &[]),
                "getEpochSchedule",
                "Failed to fetch epoch schedule",
                no_params,
            ),
            Tool::new(
                "get_latest_blockhash",
                "Get the latest blockhash",
                object_schema(json!({}), &[]),
                "getLatestBlockhash",
                "Failed to fetch latest blockhash",
                no_params,
            ),
            Tool::new(
                "get_minimum_balance_for_rent_exemption",
                "Get the minimum balance an account needs to be rent exempt",
                object_schema(
                    json!({ "size": integer_prop("Account data length in bytes") }),
                    &["size"],
                ),
                "getMinimumBalanceForRentExemption",
                "Failed to fetch minimum balance for rent exemption",
                rent_exemption_params,
            ),
            Tool::new(
                "get_multiple_accounts",
                "Get information about several Solana accounts at once",
                object_schema(
                    json!({
                        "pubkeys": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Base58 addresses of the accounts"
                        }
                    }),
                    &["pubkeys"],
                ),
                "getMultipleAccounts",
                "Failed to fetch multiple accounts",
                multiple_accounts_params,
            ),
            Tool::new(
                "get_slot",
                "Get the current slot",
                object_schema(json!({}), &[]),
                "getSlot",
                "Failed to fetch current slot",
                no_params,
            ),
            Tool::new(
                "get_stake_activation",
                "Get the activation state of a stake account",
                object_schema(
                    json!({ "stake_account": string_prop("Base58 address of the stake account") }),
                    &["stake_account"],
                ),
                "getStakeActivation",
                "Failed to fetch stake activation",
                stake_params,
            ),
            Tool::new(
                "get_supply",
                "Get information about the current SOL supply",
                object_schema(json!({}), &[]),
                "getSupply",
                "Failed to fetch supply info",
                supply_params,
            ),
            Tool::new(
                "get_transaction_count",
                "Get the current transaction count from the ledger",
                object_schema(json!({}), &[]),
                "getTransactionCount",
                "Failed to fetch transaction count",
                no_params,
            ),
        ];

        Self { tools }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Return the list of tool definitions for the MCP `tools/list` method.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition.clone()).collect()
    }

    /// # Errors
    ///
    /// Returns an error for an unknown tool or mistyped arguments.
    pub fn build_request(&self, name: &str, args: Value) -> Result<RpcRequest, ToolError> {
        self.lookup(name)?.build_request(args)
    }

    /// Look up `name` and run it against `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown tool or mistyped arguments.
    pub async fn call(
        &self,
        transport: &dyn RpcTransport,
        name: &str,
        args: Value,
    ) -> Result<Value, ToolError> {
        self.lookup(name)?.call(transport, args).await
    }

    fn lookup(&self, name: &str) -> Result<&Tool, ToolError> {
        self.get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn string_prop(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn integer_prop(description: &str) -> Value {
    json!({ "type": "integer", "minimum": 0, "description": description })
}

#[derive(Deserialize)]
struct AddressArgs {
    address: String,
}

#[derive(Deserialize)]
struct ProgramArgs {
    program_id: String,
}

#[derive(Deserialize)]
struct TokenAccountArgs {
    token_account: String,
}

#[derive(Deserialize)]
struct OwnerArgs {
    owner: String,
}

#[derive(Deserialize)]
struct BlocksArgs {
    start_slot: u64,
    #[serde(default)]
    end_slot: Option<u64>,
}

#[derive(Deserialize)]
struct RentExemptionArgs {
    size: u64,
}

#[derive(Deserialize)]
struct MultipleAccountsArgs {
    pubkeys: Vec<String>,
}

#[derive(Deserialize)]
struct StakeArgs {
    stake_account: String,
}

#[derive(Deserialize)]
struct NoArgs {}

fn account_info_params(args: Value) -> Result<Vec<Value>, serde_json::Error> {
    let AddressArgs { address } = serde_json::from_value(args)?;
    Ok(vec![json!(address), json!({ "encoding": "base58" })])
}

fn address_params(args: Value) -> Result<Vec<Value>, serde_json::Error> {
    let AddressArgs { address } = serde_json::from_value(args)?;
    Ok(vec![json!(address)])
}

fn program_params(args: Value) -> Result<Vec<Value>, serde_json::Error> {
    let ProgramArgs { program_id } = serde_json::from_value(args)?;
    Ok(vec![json!(program_id)])
}

fn token_account_params(args: Value) -> Result<Vec<Value>, serde_json::Error> {
    let TokenAccountArgs { token_account } = serde_json::from_value(args)?;
    Ok(vec![json!(token_account)])
}

fn owner_params(args: Value) -> Result<Vec<Value>, serde_json::Error> {
    let OwnerArgs { owner } = serde_json::from_value(args)?;
    Ok(vec![
        json!(owner),
        json!({ "programId": TOKEN_PROGRAM_ID }),
        json!({ "encoding": "jsonParsed" }),
    ])
}

// The end bound is dropped entirely when absent, not sent as null.
fn blocks_params(args: Value) -> Result<Vec<Value>, serde_json::Error> {
    let BlocksArgs {
        start_slot,
        end_slot,
    } = serde_json::from_value(args)?;

    let mut params = vec![json!(start_slot)];
    if let Some(end_slot) = end_slot {
        params.push(json!(end_slot));
    }
    Ok(params)
}

fn rent_exemption_params(args: Value) -> Result<Vec<Value>, serde_json::Error> {
    let RentExemptionArgs { size } = serde_json::from_value(args)?;
    Ok(vec![json!(size)])
}

fn multiple_accounts_params(args: Value) -> Result<Vec<Value>, serde_json::Error> {
    let MultipleAccountsArgs { pubkeys } = serde_json::from_value(args)?;
    Ok(vec![json!(pubkeys), json!({ "encoding": "jsonParsed" })])
}

fn stake_params(args: Value) -> Result<Vec<Value>, serde_json::Error> {
    let StakeArgs { stake_account } = serde_json::from_value(args)?;
    Ok(vec![json!(stake_account)])
}

fn supply_params(args: Value) -> Result<Vec<Value>, serde_json::Error> {
    let NoArgs {} = serde_json::from_value(args)?;
    Ok(vec![json!({ "excludeNonCirculatingAccountsList": false })])
}

fn no_params(args: Value) -> Result<Vec<Value>, serde_json::Error> {
    let NoArgs {} = serde_json::from_value(args)?;
    Ok(Vec::new())
}
