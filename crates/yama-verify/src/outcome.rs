use yama_common::Dsignal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyError {
    pub dsignal: Dsignal,
    pub message: String,
}

impl VerifyError {
    pub fn new(dsignal: Dsignal, message: impl Into<String>) -> Self {
        Self { dsignal, message: message.into() }
    }
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.dsignal, self.message)
    }
}
