//! Dialect independent handler signatures.
//!
//! | in | out | in stream | out stream | parameters after context   | returns            |
//! |----|-----|-----------|------------|----------------------------|--------------------|
//! | -  | -   | -         | -          |                            | error              |
//! | -  | -   | -         | x          | out streamer               | error              |
//! | -  | -   | x         | -          | in streamer                | error              |
//! | -  | -   | x         | x          | in/out streamer            | error              |
//! | -  | x   | -         | -          |                            | outputs..., error  |
//! | -  | x   | -         | x          | responder                  | error              |
//! | -  | x   | x         | -          | in streamer                | outputs..., error  |
//! | -  | x   | x         | x          | responder                  | error              |
//! | x  | -   | -         | -          | inputs...                  | error              |
//! | x  | -   | -         | x          | inputs..., out streamer    | error              |
//! | x  | -   | x         | -          | inputs..., in streamer     | error              |
//! | x  | -   | x         | x          | inputs..., in/out streamer | error              |
//! | x  | x   | -         | -          | inputs...                  | outputs..., error  |
//! | x  | x   | -         | x          | inputs..., responder       | error              |
//! | x  | x   | x         | -          | inputs..., responder       | error              |
//! | x  | x   | x         | x          | inputs..., responder       | error              |

use crate::{error::Result, types::TypeMapper};

use super::MethodDefinition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Context,
    Value { name: String, ty: String },
    InStreamer(String),
    OutStreamer(String),
    InOutStreamer { input: String, output: String },
    Responder(String),
}

impl Param {
    pub fn name(&self) -> &str {
        match self {
            Param::Context => "ctx",
            Param::Value { name, .. } => name,
            Param::InStreamer(_) => "inStream",
            Param::OutStreamer(_) => "outStream",
            Param::InOutStreamer { .. } => "inOutStream",
            Param::Responder(_) => "responder",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Returns {
    /// Only an error.
    Error,
    /// The listed values followed by an error.
    Values(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub params: Vec<Param>,
    pub returns: Returns,
    /// Set when the outputs travel through a responder object.
    pub responder: Option<String>,
}

impl Signature {
    /// Lays out the handler signature of `definition`.
    ///
    /// Every type goes through [`TypeMapper::maybe_pointer`], stream element types
    /// included.
    pub fn synthesize(definition: &MethodDefinition<'_>, mapper: &TypeMapper<'_>) -> Result<Self> {
        let shape = definition.shape();
        let mut params = vec![Param::Context];

        for (index, value) in definition.inputs().iter().enumerate() {
            let name = match value.name {
                Some(name) => name.to_string(),
                None => format!("arg{index}"),
            };
            params.push(Param::Value {
                name,
                ty: mapper.maybe_pointer(value.ty)?,
            });
        }

        if shape.responder_required() {
            let responder = definition.responder_name();
            params.push(Param::Responder(responder.clone()));

            return Ok(Self {
                name: definition.name().to_string(),
                params,
                returns: Returns::Error,
                responder: Some(responder),
            });
        }

        match (definition.input_stream(), definition.output_stream()) {
            (Some(input), Some(output)) => params.push(Param::InOutStreamer {
                input: mapper.maybe_pointer(input)?,
                output: mapper.maybe_pointer(output)?,
            }),
            (Some(input), None) => params.push(Param::InStreamer(mapper.maybe_pointer(input)?)),
            (None, Some(output)) => params.push(Param::OutStreamer(mapper.maybe_pointer(output)?)),
            (None, None) => {}
        }

        let returns = if shape.has_output {
            let values = definition
                .outputs()
                .iter()
                .map(|value| mapper.maybe_pointer(value.ty))
                .collect::<Result<Vec<_>>>()?;
            Returns::Values(values)
        } else {
            Returns::Error
        };

        Ok(Self {
            name: definition.name().to_string(),
            params,
            returns,
            responder: None,
        })
    }

    /// Lays out the call a client makes to the server method `definition`.
    ///
    /// The client sends what the server receives. Without streams the received values
    /// are returned directly; with a stream on either side the call hands back the
    /// client responder, which owns the streamer and the received values.
    pub fn synthesize_call(
        definition: &MethodDefinition<'_>,
        mapper: &TypeMapper<'_>,
    ) -> Result<Self> {
        let client = definition.for_client();
        let mut params = vec![Param::Context];

        for (index, value) in client.outputs().iter().enumerate() {
            let name = match value.name {
                Some(name) => name.to_string(),
                None => format!("arg{index}"),
            };
            params.push(Param::Value {
                name,
                ty: mapper.maybe_pointer(value.ty)?,
            });
        }

        if client.shape().has_stream() {
            let responder = client.responder_name();
            return Ok(Self {
                name: definition.name().to_string(),
                params,
                returns: Returns::Values(vec![mapper.dialect().pointer(responder.clone())]),
                responder: Some(responder),
            });
        }

        let returns = if client.inputs().is_empty() {
            Returns::Error
        } else {
            let values = client
                .inputs()
                .iter()
                .map(|value| mapper.maybe_pointer(value.ty))
                .collect::<Result<Vec<_>>>()?;
            Returns::Values(values)
        };

        Ok(Self {
            name: definition.name().to_string(),
            params,
            returns,
            responder: None,
        })
    }
}
