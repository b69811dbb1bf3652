//! Payment code generation, countdown and parsing commands

use anyhow::{Context, Result};
use pixkit_lib::decode::parse_payload;
use pixkit_lib::session::{ClipboardPort, MemoryClipboard, SystemClock};
use pixkit_lib::{
    PaymentAmount, PaymentRequest, PayloadBuilder, PixConfig, PixError, QrSessionController,
    SessionState,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ui;

/// Request fields given on the command line
pub struct RequestFlags {
    pub key: String,
    pub amount: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub txid: Option<String>,
    pub description: Option<String>,
    pub expires: Option<u32>,
}

/// How `qr generate` presents its result
pub struct GenerateOptions {
    pub watch: bool,
    pub auto_refresh: bool,
    pub copy_to: Option<PathBuf>,
    pub raw: bool,
}

/// Clipboard stand-in that writes the payload to a file
pub struct FileClipboard {
    path: PathBuf,
}

impl FileClipboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ClipboardPort for FileClipboard {
    fn copy(&self, text: &str) -> pixkit_lib::Result<()> {
        std::fs::write(&self.path, text).map_err(|e| {
            PixError::Clipboard(format!("cannot write {}: {}", self.path.display(), e))
        })
    }
}

/// Build a request from command-line flags
pub fn request_from_flags(flags: RequestFlags) -> Result<PaymentRequest> {
    let mut request = PaymentRequest::new(flags.key).with_merchant(
        flags.name.unwrap_or_default(),
        flags.city.unwrap_or_default(),
    );

    if let Some(amount) = flags.amount {
        let amount = PaymentAmount::from_str_checked(&amount)
            .with_context(|| format!("Invalid amount '{}'", amount))?;
        request = request.with_amount(amount);
    }
    if let Some(txid) = flags.txid {
        request = request.with_transaction_id(txid);
    }
    if let Some(description) = flags.description {
        request = request.with_description(description);
    }
    if let Some(minutes) = flags.expires {
        request = request.with_expiration_minutes(minutes);
    }

    Ok(request)
}

/// Read a request from a JSON file
pub fn load_request(path: &Path) -> Result<PaymentRequest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {}", path.display()))?;
    let request: PaymentRequest = serde_json::from_str(&json)
        .with_context(|| format!("Invalid request file {}", path.display()))?;
    Ok(request)
}

/// Generate a payment code, optionally copying it and watching it expire
pub async fn generate(
    config: PixConfig,
    request: PaymentRequest,
    options: GenerateOptions,
    verbose: bool,
) -> Result<()> {
    let clipboard: Arc<dyn ClipboardPort> = match &options.copy_to {
        Some(path) => Arc::new(FileClipboard::new(path)),
        None => Arc::new(MemoryClipboard::new()),
    };
    let mut controller =
        QrSessionController::new(PayloadBuilder::new(config), Arc::new(SystemClock), clipboard);
    let mut updates = controller.subscribe();

    let snapshot = controller.start(request.clone())?;
    let payload = controller
        .payload_text()
        .context("Session has no payload")?;

    if options.raw {
        println!("{}", payload);
    } else {
        show_payment_code(&request, &payload, verbose)?;
        ui::key_value("Transaction ID", snapshot.transaction_id.as_str());
        ui::key_value("Expires in", &snapshot.remaining_display);
    }

    if let Some(path) = &options.copy_to {
        match controller.copy_payload() {
            Ok(()) => {
                if !options.raw {
                    ui::success(&format!("Payload copied to {}", path.display()));
                }
            }
            // Copy failures are reported but never abort the command.
            Err(e) => ui::error(&format!("Could not copy payload: {}", e)),
        }
    }

    if !options.watch {
        return Ok(());
    }

    ui::separator();
    ui::info("Watching expiration (Ctrl-C to stop)");
    let mut bar = ui::countdown(snapshot.remaining_seconds)?;
    ui::update_countdown(&bar, &snapshot);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let Some(snapshot) = updates.borrow_and_update().clone() else {
                    break;
                };
                ui::update_countdown(&bar, &snapshot);

                if snapshot.state != SessionState::Expired {
                    continue;
                }
                bar.finish_and_clear();
                ui::warning(&format!(
                    "Payment code {} expired",
                    snapshot.transaction_id
                ));
                if !options.auto_refresh {
                    break;
                }

                let fresh = controller.refresh()?;
                let payload = controller
                    .payload_text()
                    .context("Session has no payload")?;
                if let Err(e) = ui::clear() {
                    tracing::debug!(error = %e, "could not clear terminal");
                }
                show_payment_code(&request, &payload, verbose)?;
                ui::key_value("Transaction ID", fresh.transaction_id.as_str());
                if options.copy_to.is_some() {
                    if let Err(e) = controller.copy_payload() {
                        ui::error(&format!("Could not copy payload: {}", e));
                    }
                }
                bar = ui::countdown(fresh.remaining_seconds)?;
                ui::update_countdown(&bar, &fresh);
            }
            _ = tokio::signal::ctrl_c() => {
                bar.finish_and_clear();
                ui::info("Stopped");
                break;
            }
        }
    }

    controller.stop();
    Ok(())
}

fn show_payment_code(request: &PaymentRequest, payload: &str, verbose: bool) -> Result<()> {
    ui::header("Pix Payment Code");

    let parsed = parse_payload(payload)?;
    ui::key_value("Recipient", parsed.recipient_key().unwrap_or("-"));
    match parsed.amount() {
        Some(amount) => ui::key_value("Amount", &format!("R$ {}", amount)),
        None => ui::key_value("Amount", "chosen by payer"),
    }
    ui::key_value("Merchant", parsed.merchant_name().unwrap_or("-"));
    ui::key_value("City", parsed.merchant_city().unwrap_or("-"));
    if let Some(description) = parsed.description() {
        ui::key_value("Description", description);
    }
    if verbose {
        ui::key_value("Raw key", &request.recipient_key);
        ui::key_value("CRC", parsed.checksum());
    }

    println!();
    // The code stays valid without its image; the text below is enough to pay.
    if let Err(e) = ui::qr_code(payload) {
        tracing::warn!(error = %e, "QR rendering failed");
        ui::error(&format!("Could not render QR code: {}", e));
    }
    ui::key_value("Copy and paste", payload);
    Ok(())
}

/// Parse a copy-and-paste payment code
pub fn parse(data: &str, as_json: bool, verbose: bool) -> Result<()> {
    let parsed = match parse_payload(data) {
        Ok(parsed) => parsed,
        Err(e @ PixError::ChecksumMismatch { .. }) => {
            ui::error(&format!("Checksum verification failed: {}", e));
            return Err(e.into());
        }
        Err(e) => {
            ui::error("Not a valid payment code");
            return Err(e.into());
        }
    };

    if as_json {
        let fields: serde_json::Map<String, serde_json::Value> = parsed
            .fields()
            .iter()
            .map(|f| (f.tag().to_string(), serde_json::Value::from(f.value())))
            .collect();
        ui::json(&serde_json::json!({
            "recipientKey": parsed.recipient_key(),
            "description": parsed.description(),
            "amount": parsed.amount().map(|a| a.to_string()),
            "merchantName": parsed.merchant_name(),
            "merchantCity": parsed.merchant_city(),
            "transactionId": parsed.transaction_id().map(|t| t.to_string()),
            "checksum": parsed.checksum(),
            "fields": fields,
        }));
        return Ok(());
    }

    ui::header("Parse Payment Code");
    ui::success("Checksum OK");
    ui::key_value("Recipient", parsed.recipient_key().unwrap_or("-"));
    match parsed.amount() {
        Some(amount) => ui::key_value("Amount", &format!("R$ {}", amount)),
        None => ui::key_value("Amount", "chosen by payer"),
    }
    ui::key_value("Merchant", parsed.merchant_name().unwrap_or("-"));
    ui::key_value("City", parsed.merchant_city().unwrap_or("-"));
    if let Some(description) = parsed.description() {
        ui::key_value("Description", description);
    }
    if let Some(txid) = parsed.transaction_id() {
        ui::key_value("Transaction ID", txid.as_str());
    }
    ui::key_value("CRC", parsed.checksum());

    if verbose {
        ui::separator();
        for field in parsed.fields() {
            ui::key_value(field.tag(), field.value());
            for child in field.children() {
                ui::key_value(&format!("  {}", child.tag()), child.value());
            }
        }
    }

    Ok(())
}
