//! Classification of service methods by their shape.
//!
//! A method's shape is the combination of four flags: whether it takes ordinary
//! inputs, returns ordinary outputs, consumes an input stream and produces an output
//! stream. The sixteen combinations each render to a different handler signature, see
//! [`signature`].

use heck::ToUpperCamelCase;

use arf_ast::{ServiceMethod, Type};

use crate::error::{CodegenError, Result, StreamDirection};

pub mod signature;

pub use signature::{Param, Returns, Signature};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Shape {
    pub has_input: bool,
    pub has_output: bool,
    pub has_input_stream: bool,
    pub has_output_stream: bool,
}

impl Shape {
    /// Builds a shape from the low four bits of `bits`, input being the highest.
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            has_input: bits & 0b1000 != 0,
            has_output: bits & 0b0100 != 0,
            has_input_stream: bits & 0b0010 != 0,
            has_output_stream: bits & 0b0001 != 0,
        }
    }

    /// All sixteen shapes, in table order.
    pub fn all() -> impl Iterator<Item = Shape> {
        (0..16u8).map(Shape::from_bits)
    }

    /// Whether the handler needs a responder object instead of plain parameters and
    /// return values.
    ///
    /// This is the case when outputs have to be produced alongside an output stream, or
    /// when the handler takes both inputs and an input stream while still owing outputs.
    pub fn responder_required(self) -> bool {
        self.has_output && (self.has_output_stream || (self.has_input_stream && self.has_input))
    }

    pub fn has_stream(self) -> bool {
        self.has_input_stream || self.has_output_stream
    }

    pub fn mirrored(self) -> Shape {
        Shape {
            has_input: self.has_output,
            has_output: self.has_input,
            has_input_stream: self.has_output_stream,
            has_output_stream: self.has_input_stream,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Server,
    Client,
}

impl Side {
    fn flip(self) -> Side {
        match self {
            Side::Server => Side::Client,
            Side::Client => Side::Server,
        }
    }
}

/// A named (or anonymous) value flowing in or out of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodValue<'a> {
    pub name: Option<&'a str>,
    pub ty: &'a Type,
}

/// A service method split into ordinary values and stream slots.
///
/// Built once per method. [`MethodDefinition::for_client`] gives the mirrored view used
/// on the calling side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDefinition<'a> {
    method: &'a ServiceMethod,
    package: &'a str,
    service: &'a str,
    side: Side,
    inputs: Vec<MethodValue<'a>>,
    outputs: Vec<MethodValue<'a>>,
    input_stream: Option<&'a Type>,
    output_stream: Option<&'a Type>,
}

impl<'a> MethodDefinition<'a> {
    /// Fails with [`CodegenError::MultipleStreams`] when more than one parameter, or
    /// more than one return value, is streamed.
    pub fn new(package: &'a str, service: &'a str, method: &'a ServiceMethod) -> Result<Self> {
        let mut inputs = Vec::new();
        let mut input_stream = None;
        for param in &method.params {
            if !param.stream {
                inputs.push(MethodValue {
                    name: param.name.as_deref(),
                    ty: &param.ty,
                });
            } else if input_stream.replace(&param.ty).is_some() {
                return Err(CodegenError::MultipleStreams {
                    method: method.name.clone(),
                    direction: StreamDirection::Input,
                });
            }
        }

        let mut outputs = Vec::new();
        let mut output_stream = None;
        for ret in &method.returns {
            if !ret.stream {
                outputs.push(MethodValue {
                    name: None,
                    ty: &ret.ty,
                });
            } else if output_stream.replace(&ret.ty).is_some() {
                return Err(CodegenError::MultipleStreams {
                    method: method.name.clone(),
                    direction: StreamDirection::Output,
                });
            }
        }

        Ok(Self {
            method,
            package,
            service,
            side: Side::Server,
            inputs,
            outputs,
            input_stream,
            output_stream,
        })
    }

    pub fn name(&self) -> &'a str {
        &self.method.name
    }

    pub fn service(&self) -> &'a str {
        self.service
    }

    pub fn package(&self) -> &'a str {
        self.package
    }

    pub fn method(&self) -> &'a ServiceMethod {
        self.method
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn inputs(&self) -> &[MethodValue<'a>] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[MethodValue<'a>] {
        &self.outputs
    }

    pub fn input_stream(&self) -> Option<&'a Type> {
        self.input_stream
    }

    pub fn output_stream(&self) -> Option<&'a Type> {
        self.output_stream
    }

    pub fn shape(&self) -> Shape {
        Shape {
            has_input: !self.inputs.is_empty(),
            has_output: !self.outputs.is_empty(),
            has_input_stream: self.input_stream.is_some(),
            has_output_stream: self.output_stream.is_some(),
        }
    }

    pub fn responder_required(&self) -> bool {
        self.shape().responder_required()
    }

    /// `<Package><Service><Method>Responder`, with a `Client` marker on the client view.
    pub fn responder_name(&self) -> String {
        let package = self.package.rsplit('.').next().unwrap_or(self.package);
        let side = match self.side {
            Side::Server => "",
            Side::Client => "Client",
        };

        format!(
            "{}{}{}{side}Responder",
            package.to_upper_camel_case(),
            self.service.to_upper_camel_case(),
            self.method.name.to_upper_camel_case(),
        )
    }

    /// The method as seen by the caller: what the server receives the client sends,
    /// and what the server streams out the client streams in.
    pub fn for_client(&self) -> MethodDefinition<'a> {
        MethodDefinition {
            method: self.method,
            package: self.package,
            service: self.service,
            side: self.side.flip(),
            inputs: self.outputs.clone(),
            outputs: self.inputs.clone(),
            input_stream: self.output_stream,
            output_stream: self.input_stream,
        }
    }

    /// Checks that mirroring twice gives this definition back.
    pub fn check_involution(&self) -> Result<()> {
        if self.for_client().for_client() == *self {
            Ok(())
        } else {
            Err(CodegenError::NonInvolutiveClientTransform {
                method: self.method.name.clone(),
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use arf_ast::{DeclId, EnumMember, Schema, SchemaBuilder};

    use super::*;

    /// Schema with one struct, one enum and one method per shape, named `m0`..`m15`.
    pub(crate) fn shapes_schema() -> (Schema, DeclId) {
        let mut builder = SchemaBuilder::new();
        let pkg = builder.package("org.example.chat");
        let message = builder.add_struct(pkg, "message");
        let mood = builder.add_enum(pkg, "mood", vec![EnumMember::new("happy", 0)]);

        let methods = Shape::all()
            .enumerate()
            .map(|(index, shape)| {
                let mut method = ServiceMethod::new(format!("m{index}"));
                if shape.has_input {
                    method = method
                        .param("room", Type::primitive("string"))
                        .param("sender", Type::user("message", message));
                }
                if shape.has_input_stream {
                    method = method.stream_param(Type::user("message", message));
                }
                if shape.has_output {
                    method = method
                        .returns(Type::user("mood", mood))
                        .returns(Type::primitive("int64"));
                }
                if shape.has_output_stream {
                    method = method.stream_returns(Type::user("mood", mood));
                }
                method
            })
            .collect();
        let service = builder.add_service(pkg, "chat", methods);

        (builder.build(), service)
    }

    fn definitions(schema: &Schema, service: DeclId) -> Vec<MethodDefinition<'_>> {
        let decl = schema.get(service).unwrap();
        decl.as_service()
            .unwrap()
            .methods
            .iter()
            .map(|method| MethodDefinition::new(&decl.package, &decl.name, method).unwrap())
            .collect()
    }

    #[test]
    fn responder_table() {
        // (in, out, in stream, out stream) -> responder
        let table = [
            ((false, false, false, false), false),
            ((false, false, false, true), false),
            ((false, false, true, false), false),
            ((false, false, true, true), false),
            ((false, true, false, false), false),
            ((false, true, false, true), true),
            ((false, true, true, false), false),
            ((false, true, true, true), true),
            ((true, false, false, false), false),
            ((true, false, false, true), false),
            ((true, false, true, false), false),
            ((true, false, true, true), false),
            ((true, true, false, false), false),
            ((true, true, false, true), true),
            ((true, true, true, false), true),
            ((true, true, true, true), true),
        ];

        for (shape, ((i, o, ins, outs), expected)) in Shape::all().zip(table) {
            assert_eq!(
                shape,
                Shape {
                    has_input: i,
                    has_output: o,
                    has_input_stream: ins,
                    has_output_stream: outs,
                }
            );
            assert_eq!(shape.responder_required(), expected, "{shape:?}");
        }
    }

    #[test]
    fn definitions_classify_their_method() {
        let (schema, service) = shapes_schema();

        for (definition, shape) in definitions(&schema, service).iter().zip(Shape::all()) {
            assert_eq!(definition.shape(), shape, "{}", definition.name());
            assert_eq!(definition.responder_required(), shape.responder_required());
            assert_eq!(definition.inputs().len(), if shape.has_input { 2 } else { 0 });
            assert_eq!(definition.outputs().len(), if shape.has_output { 2 } else { 0 });
        }
    }

    #[test]
    fn client_view_is_an_involution() {
        let (schema, service) = shapes_schema();

        for definition in definitions(&schema, service) {
            let client = definition.for_client();
            assert_eq!(client.shape(), definition.shape().mirrored());
            assert_eq!(client.input_stream(), definition.output_stream());
            assert_eq!(client.output_stream(), definition.input_stream());
            assert_eq!(client.side(), Side::Client);

            let back = client.for_client();
            assert_eq!(back, definition);
            assert_eq!(back.shape(), definition.shape());
            definition.check_involution().unwrap();
        }
    }

    #[test]
    fn mirrored_output_stream_still_needs_a_responder() {
        let method = ServiceMethod::new("watch")
            .param("id", Type::primitive("string"))
            .returns(Type::primitive("int32"))
            .stream_returns(Type::primitive("string"));
        let definition = MethodDefinition::new("org.example.feed", "feed", &method).unwrap();

        assert_eq!(
            definition.shape(),
            Shape {
                has_input: true,
                has_output: true,
                has_input_stream: false,
                has_output_stream: true,
            }
        );
        assert!(definition.responder_required());

        let client = definition.for_client();
        assert_eq!(
            client.shape(),
            Shape {
                has_input: true,
                has_output: true,
                has_input_stream: true,
                has_output_stream: false,
            }
        );
        assert!(client.responder_required());
        assert_eq!(definition.responder_name(), "FeedFeedWatchResponder");
        assert_eq!(client.responder_name(), "FeedFeedWatchClientResponder");
    }

    #[test]
    fn client_view_does_not_touch_the_original() {
        let method = ServiceMethod::new("upload")
            .stream_param(Type::primitive("bytes"))
            .returns(Type::primitive("string"));
        let definition = MethodDefinition::new("files", "storage", &method).unwrap();
        let before = definition.clone();

        let client = definition.for_client();

        assert_eq!(definition, before);
        assert_ne!(client, definition);
        assert!(std::ptr::eq(client.method(), definition.method()));
    }

    #[test]
    fn two_streams_on_one_side_are_rejected() {
        let method = ServiceMethod::new("merge")
            .stream_param(Type::primitive("int32"))
            .stream_param(Type::primitive("int32"));

        assert_eq!(
            MethodDefinition::new("pkg", "svc", &method),
            Err(CodegenError::MultipleStreams {
                method: "merge".into(),
                direction: StreamDirection::Input,
            })
        );

        let method = ServiceMethod::new("split")
            .stream_returns(Type::primitive("int32"))
            .stream_returns(Type::primitive("int32"));
        assert!(matches!(
            MethodDefinition::new("pkg", "svc", &method),
            Err(CodegenError::MultipleStreams {
                direction: StreamDirection::Output,
                ..
            })
        ));
    }
}
