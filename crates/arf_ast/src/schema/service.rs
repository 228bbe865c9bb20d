use serde::{Deserialize, Serialize};

use super::Type;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBody {
    #[serde(default)]
    pub methods: Vec<ServiceMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMethod {
    pub name: String,
    #[serde(default)]
    pub params: Vec<MethodParam>,
    #[serde(default)]
    pub returns: Vec<MethodReturn>,
    #[serde(default)]
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodParam {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodReturn {
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub stream: bool,
}

impl ServiceMethod {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.params.push(MethodParam {
            name: Some(name.into()),
            ty,
            stream: false,
        });
        self
    }

    pub fn stream_param(mut self, ty: Type) -> Self {
        self.params.push(MethodParam {
            name: None,
            ty,
            stream: true,
        });
        self
    }

    pub fn returns(mut self, ty: Type) -> Self {
        self.returns.push(MethodReturn { ty, stream: false });
        self
    }

    pub fn stream_returns(mut self, ty: Type) -> Self {
        self.returns.push(MethodReturn { ty, stream: true });
        self
    }

    pub fn comment(mut self, line: impl Into<String>) -> Self {
        self.comments.push(line.into());
        self
    }
}
