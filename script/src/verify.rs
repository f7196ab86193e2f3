use chain::Transaction;
use flags::VerificationFlags;
use script::Script;

/// Boolean oracle around the script interpreter.
///
/// Input scripts are checked against the scripts of the outputs they spend;
/// the interpreter itself lives outside this crate.
pub trait ScriptVerifier: Send + Sync {
	fn verify_script(
		&self,
		prevout_script: &Script,
		transaction: &Transaction,
		input_index: usize,
		flags: VerificationFlags,
	) -> bool;
}

/// Verifier accepting every script. Used when input scripts are known good,
/// e.g. when importing blocks below a trusted height.
pub struct AcceptingScriptVerifier;

impl ScriptVerifier for AcceptingScriptVerifier {
	fn verify_script(&self, _: &Script, _: &Transaction, _: usize, _: VerificationFlags) -> bool {
		true
	}
}

/// Verifier rejecting every script.
pub struct RejectingScriptVerifier;

impl ScriptVerifier for RejectingScriptVerifier {
	fn verify_script(&self, _: &Script, _: &Transaction, _: usize, _: VerificationFlags) -> bool {
		false
	}
}
