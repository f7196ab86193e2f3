bitflags! {
	/// Consensus rule activations handed to the script interpreter.
	pub struct VerificationFlags: u32 {
		const NONE = 0;

		/// Evaluate P2SH subscripts (softfork safe, BIP16).
		const VERIFY_P2SH = 0x1;

		/// Passing a non-strict-DER signature to a checksig operation causes script failure (BIP66).
		const VERIFY_DERSIG = 0x2;

		/// Verify CHECKLOCKTIMEVERIFY (BIP65).
		const VERIFY_CLTV = 0x4;
	}
}
