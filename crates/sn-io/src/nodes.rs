//! `nodes` file: type-tagged blocks, one per hydraulic point.

use crate::lexer::{Cursor, number};
use crate::lexer::Tok;
use crate::{IoResult, ParseError};
use sn_core::Id;
use sn_network::{EventWindow, Node, NodeKind};

const FILE: &str = "nodes";

pub fn parse_nodes(text: &str) -> IoResult<Vec<Node>> {
    let mut cursor = Cursor::new(FILE, text)?;
    cursor.expect(Tok::LBrace, "'{'")?;

    let mut nodes = Vec::new();
    while !cursor.eat_rbrace() {
        let (tag, line) = cursor.expect_word("a node type tag")?;
        let kind = match tag.as_str() {
            "node" => TypeTag::Junction,
            "source" => TypeTag::Source,
            "reservoir" => TypeTag::Reservoir,
            "valve" => TypeTag::Valve,
            _ => {
                return Err(ParseError::UnknownTag {
                    file: FILE,
                    line,
                    tag,
                });
            }
        };
        nodes.push(parse_node(&mut cursor, kind)?);
    }
    cursor.expect_end()?;

    // Ids must cover 1..=N exactly; re-order into arena order.
    let n = nodes.len();
    let mut ordered: Vec<Option<Node>> = (0..n).map(|_| None).collect();
    for node in nodes {
        let idx = node.id.index() as usize;
        if idx >= n || ordered[idx].is_some() {
            return Err(ParseError::NodeIds {
                id: node.id.one_based(),
            });
        }
        ordered[idx] = Some(node);
    }
    Ok(ordered.into_iter().map(|n| n.expect("dense ids")).collect())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TypeTag {
    Junction,
    Source,
    Reservoir,
    Valve,
}

impl TypeTag {
    fn allows(self, field: &str) -> bool {
        let common = matches!(
            field,
            "id" | "head" | "pressure" | "elevation" | "loss" | "eventstart" | "eventend"
        );
        common
            || match self {
                TypeTag::Junction => false,
                TypeTag::Source => field == "discharge",
                TypeTag::Reservoir => matches!(field, "discharge" | "level"),
                TypeTag::Valve => matches!(field, "state" | "valvetime"),
            }
    }
}

fn parse_node(cursor: &mut Cursor, tag: TypeTag) -> IoResult<Node> {
    cursor.expect(Tok::LBrace, "'{'")?;

    let mut fields: Vec<(String, f64)> = Vec::new();
    while !cursor.eat_rbrace() {
        let (field, value, line) = cursor.entry()?;
        if !tag.allows(&field) {
            return Err(ParseError::UnknownTag {
                file: FILE,
                line,
                tag: field,
            });
        }
        if fields.iter().any(|(f, _)| *f == field) {
            return Err(ParseError::Duplicate {
                file: FILE,
                line,
                field,
            });
        }
        let parsed = number(FILE, line, &field, &value)?;
        fields.push((field, parsed));
    }

    let get = |name: &str| fields.iter().find(|(f, _)| f == name).map(|(_, v)| *v);

    let id_value = get("id").ok_or(ParseError::Missing {
        file: FILE,
        field: "id",
    })?;
    let id = Id::from_one_based(id_value as u32)?;

    let kind = match tag {
        TypeTag::Junction => NodeKind::Junction,
        TypeTag::Source => NodeKind::Source {
            discharge: get("discharge"),
        },
        TypeTag::Reservoir => NodeKind::Reservoir {
            level: get("level").ok_or(ParseError::Missing {
                file: FILE,
                field: "level",
            })?,
            discharge: get("discharge"),
        },
        TypeTag::Valve => NodeKind::Valve {
            state: get("state").unwrap_or(1.0),
            // Signed actuation: the stored rate is the reciprocal of the
            // scheduled travel time; ±0 encodes an instantaneous snap.
            rate: get("valvetime").map_or(0.0, |t| 1.0 / t),
        },
    };

    let mut node = Node::new(id, kind, get("elevation").unwrap_or(0.0), get("loss").unwrap_or(0.0));
    node.input_head = get("head");
    node.input_pressure = get("pressure");
    let start = get("eventstart").unwrap_or(-1.0);
    if start >= 0.0 {
        let end = get("eventend").filter(|e| *e >= 0.0).unwrap_or(start);
        node.event = Some(EventWindow::new(start, end));
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
{
    reservoir
    {
        id: 1;
        elevation: 0;
        level: 100;
    }
    valve
    {
        id: 2;
        state: 1;
        valvetime: -0;
        eventstart: 1.0;
        eventend: 1.0;
    }
    reservoir
    {
        id: 3;
        elevation: 0;
        level: 50;
        loss: 0.5;
    }
}
";

    #[test]
    fn parses_typed_blocks_in_any_order() {
        let nodes = parse_nodes(SAMPLE).unwrap();
        assert_eq!(nodes.len(), 3);
        assert!(matches!(nodes[0].kind, NodeKind::Reservoir { level, .. } if level == 100.0));
        assert_eq!(nodes[2].loss, 0.5);
    }

    #[test]
    fn instantaneous_valve_rate_is_negative_infinity() {
        let nodes = parse_nodes(SAMPLE).unwrap();
        let NodeKind::Valve { state, rate } = nodes[1].kind else {
            panic!("expected a valve");
        };
        assert_eq!(state, 1.0);
        assert!(rate.is_infinite() && rate < 0.0);
        let event = nodes[1].event.unwrap();
        assert_eq!((event.start, event.end), (1.0, 1.0));
        assert!(!event.handled);
    }

    #[test]
    fn field_not_of_the_type_is_rejected() {
        let text = "{ node { id: 1; level: 3; } }";
        assert!(matches!(
            parse_nodes(text).unwrap_err(),
            ParseError::UnknownTag { .. }
        ));
    }

    #[test]
    fn duplicate_field_is_fatal() {
        let text = "{ node { id: 1; elevation: 1; elevation: 2; } }";
        assert!(matches!(
            parse_nodes(text).unwrap_err(),
            ParseError::Duplicate { .. }
        ));
    }

    #[test]
    fn sparse_ids_are_fatal() {
        let text = "{ node { id: 1; } node { id: 3; } }";
        assert!(matches!(
            parse_nodes(text).unwrap_err(),
            ParseError::NodeIds { .. }
        ));
    }
}
