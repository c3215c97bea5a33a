//! QASM payload rewriting
//!
//! The execution endpoints expect circuits without a version header.

/// Version headers removed before submission
pub const VERSION_HEADERS: [&str; 2] = ["IBMQASM 2.0;", "OPENQASM 2.0;"];

/// Remove every QASM version header, leaving the rest of the text untouched
pub fn strip_version_header(qasm: &str) -> String {
    VERSION_HEADERS
        .iter()
        .fold(qasm.to_string(), |text, header| text.replace(header, ""))
}
