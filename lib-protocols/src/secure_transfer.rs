//! Secure Wallet Transfer Handler
//! 
//! Implements proper client-side signing with server-side verification for secure transactions.
//! This handler ensures that:
//! 1. Clients sign transactions with their private keys
//! 2. Server verifies signatures using registered public keys
//! 3. No private keys are transmitted or stored on the server
//! 4. Identity verification is performed against the blockchain state

use crate::types::{ZhtpRequest, ZhtpResponse, ZhtpStatus, ZhtpMethod, ZhtpHeaders};
use crate::zhtp::{ZhtpResult, ZhtpRequestHandler};
use serde::{Deserialize, Serialize};
use serde_json::json;
use async_trait::async_trait;

use lib_crypto::verify_signature;
use anyhow::Result as AnyhowResult;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Deserialize)]
pub struct SecureTransferRequest {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub signature: String,              // Base64 encoded signature
    pub public_key: String,             // Base64 encoded public key
    pub signed_transaction: String,     // Base64 encoded signed transaction data
}

#[derive(Debug, Serialize)]
pub struct SecureTransferResponse {
    pub success: bool,
    pub transaction_id: String,
    pub message: String,
    pub verification_details: VerificationDetails,
}

#[derive(Debug, Serialize)]
pub struct VerificationDetails {
    pub identity_verified: bool,
    pub public_key_matches: bool,
    pub signature_valid: bool,
    pub transaction_processed: bool,
}

pub struct SecureWalletTransferHandler;

impl SecureWalletTransferHandler {
    pub fn new() -> Self {
        Self
    }

    /// Verify client signature against registered public key
    async fn verify_client_signature(
        &self,
        transaction_data: &[u8],
        signature_bytes: Vec<u8>,
        provided_public_key: &[u8],
        registered_public_key: &[u8]
    ) -> AnyhowResult<bool> {
        // First check that the provided public key matches the registered one
        if provided_public_key != registered_public_key {
            return Ok(false);
        }

        // Then verify the signature using the verified public key
        match verify_signature(transaction_data, &signature_bytes, provided_public_key) {
            Ok(is_valid) => Ok(is_valid),
            Err(e) => {
                eprintln!("Signature verification failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Handle secure wallet transfer with proper cryptographic verification
    async fn handle_secure_transfer(&self, request: SecureTransferRequest) -> ZhtpResult<SecureTransferResponse> {
        println!("Processing secure transfer request from {}", request.from);

        // TODO: Blockchain access temporarily disabled - get_shared_blockchain removed
        // This functionality needs to be moved to zhtp layer
        return Err(anyhow::anyhow!("Secure transfers temporarily unavailable during blockchain provider refactor"));

        /* DISABLED DURING REFACTOR
        // Step 1: Get shared blockchain instance
        let blockchain_arc = get_shared_blockchain().await
            .context("Failed to get shared blockchain")?;
        let blockchain_guard = blockchain_arc.read().await;

        // Step 2: Verify sender identity exists on blockchain
        let identity_verified = blockchain_guard.get_identity(&request.from).is_some();
        if !identity_verified {
            return Ok(SecureTransferResponse {
                success: false,
                transaction_id: String::new(),
                message: format!("Identity '{}' not found on blockchain", request.from),
                verification_details: VerificationDetails {
                    identity_verified: false,
                    public_key_matches: false,
                    signature_valid: false,
                    transaction_processed: false,
                },
            });
        }

        // Step 3: Get registered public key for the identity
        let registered_public_key = match blockchain_guard.get_identity(&request.from) {
            Some(identity) => identity.public_key.clone(),
            None => {
                return Ok(SecureTransferResponse {
                    success: false,
                    transaction_id: String::new(),
                    message: "Could not retrieve registered public key".to_string(),
                    verification_details: VerificationDetails {
                        identity_verified: true,
                        public_key_matches: false,
                        signature_valid: false,
                        transaction_processed: false,
                    },
                });
            }
        };

        // Step 4: Decode client-provided data
        let signature_bytes = match base64::decode(&request.signature) {
            Ok(bytes) => bytes,
            Err(_) => {
                return Ok(SecureTransferResponse {
                    success: false,
                    transaction_id: String::new(),
                    message: "Invalid signature encoding".to_string(),
                    verification_details: VerificationDetails {
                        identity_verified: true,
                        public_key_matches: false,
                        signature_valid: false,
                        transaction_processed: false,
                    },
                });
            }
        };

        let provided_public_key = match general_purpose::STANDARD.decode(&request.public_key) {
            Ok(bytes) => bytes,
            Err(_) => {
                return Ok(SecureTransferResponse {
                    success: false,
                    transaction_id: String::new(),
                    message: "Invalid public key encoding".to_string(),
                    verification_details: VerificationDetails {
                        identity_verified: true,
                        public_key_matches: false,
                        signature_valid: false,
                        transaction_processed: false,
                    },
                });
            }
        };

        let transaction_data = match general_purpose::STANDARD.decode(&request.signed_transaction) {
            Ok(bytes) => bytes,
            Err(_) => {
                return Ok(SecureTransferResponse {
                    success: false,
                    transaction_id: String::new(),
                    message: "Invalid transaction data encoding".to_string(),
                    verification_details: VerificationDetails {
                        identity_verified: true,
                        public_key_matches: false,
                        signature_valid: false,
                        transaction_processed: false,
                    },
                });
            }
        };

        // Step 5: Verify the signature
        let signature_valid = match self.verify_client_signature(
            &transaction_data,
            signature_bytes,
            &provided_public_key,
            &registered_public_key
        ).await {
            Ok(valid) => valid,
            Err(e) => {
                println!("Signature verification error: {}", e);
                false
            }
        };

        let public_key_matches = provided_public_key == registered_public_key;

        if !public_key_matches || !signature_valid {
            return Ok(SecureTransferResponse {
                success: false,
                transaction_id: String::new(),
                message: "Cryptographic verification failed".to_string(),
                verification_details: VerificationDetails {
                    identity_verified: true,
                    public_key_matches,
                    signature_valid,
                    transaction_processed: false,
                },
            });
        }

        // Step 6: Process the transaction (only if signature is valid)
        drop(blockchain_guard); // Release read lock
        let mut _blockchain_write = blockchain_arc.write().await;
        
        // For now, just simulate transaction processing
        let transaction_id = format!("tx_{}", Uuid::new_v4().to_string()[..8].to_lowercase());
        
        println!("Secure transfer verified and processed: {}", transaction_id);

        Ok(SecureTransferResponse {
            success: true,
            transaction_id,
            message: "Transaction securely processed with client signature verification".to_string(),
            verification_details: VerificationDetails {
                identity_verified: true,
                public_key_matches: true,
                signature_valid: true,
                transaction_processed: true,
            },
        })
        */
    }

    fn create_response(&self, status: ZhtpStatus, body: String) -> ZhtpResponse {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        ZhtpResponse {
            version: "ZHTP/1.0".to_string(),
            status,
            headers: ZhtpHeaders::new(),
            body: body.into_bytes(),
            server: None,  // No specific server identity for this response
            status_message: match status {
                ZhtpStatus::Ok => "OK".to_string(),
                ZhtpStatus::BadRequest => "Bad Request".to_string(),
                _ => "Unknown".to_string(),
            },
            timestamp,
            validity_proof: None,
        }
    }
}

#[async_trait]
impl ZhtpRequestHandler for SecureWalletTransferHandler {
    async fn handle_request(&self, request: ZhtpRequest) -> ZhtpResult<ZhtpResponse> {
        // Parse the transfer request from JSON body
        let body_str = match String::from_utf8(request.body.clone()) {
            Ok(s) => s,
            Err(_) => {
                return Ok(self.create_response(
                    ZhtpStatus::BadRequest,
                    json!({
                        "success": false,
                        "error": "Invalid request body encoding"
                    }).to_string()
                ));
            }
        };

        let transfer_request: SecureTransferRequest = match serde_json::from_str(&body_str) {
            Ok(req) => req,
            Err(e) => {
                return Ok(self.create_response(
                    ZhtpStatus::BadRequest,
                    json!({
                        "success": false,
                        "error": format!("Invalid request format: {}", e)
                    }).to_string()
                ));
            }
        };

        // Handle the secure transfer
        let result = self.handle_secure_transfer(transfer_request).await?;

        // Return response
        let status = if result.success { 
            ZhtpStatus::Ok 
        } else { 
            ZhtpStatus::BadRequest 
        };

        Ok(self.create_response(status, serde_json::to_string(&result)?))
    }

    fn can_handle(&self, request: &ZhtpRequest) -> bool {
        request.method == ZhtpMethod::Post && request.uri.starts_with("/api/v1/wallet/transfer")
    }
}

// Test function to demonstrate the secure transfer process
#[cfg(test)]
pub fn demo_secure_transfer() {
    println!("Secure Transfer Handler initialized");
    println!("Ready to process client-signed transactions");
    
    let _handler = SecureWalletTransferHandler::new();
    
    println!("Security Features:");
    println!("   • Client-side transaction signing");
    println!("   • Server-side signature verification");
    println!("   • Identity verification against blockchain");
    println!("   • Public key validation");
    println!("   • No private keys on server");
}
