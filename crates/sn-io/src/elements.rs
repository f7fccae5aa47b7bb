//! `elements` file: declared counts followed by one block per pipe.

use crate::lexer::{Cursor, Tok, count, number};
use crate::{IoResult, ParseError};
use sn_core::Id;
use sn_network::Element;
use sn_props::{Fluid, Material};

const FILE: &str = "elements";

#[derive(Debug)]
pub struct ElementsFile {
    pub node_count: usize,
    pub elements: Vec<Element>,
}

pub fn parse_elements(text: &str, fluid: &'static Fluid) -> IoResult<ElementsFile> {
    let mut cursor = Cursor::new(FILE, text)?;

    let mut node_count: Option<usize> = None;
    let mut element_count: Option<usize> = None;
    for _ in 0..2 {
        let (tag, value, line) = cursor.entry()?;
        match tag.as_str() {
            "nodeqty" => {
                if node_count.replace(count(FILE, line, &tag, &value)?).is_some() {
                    return Err(ParseError::Duplicate {
                        file: FILE,
                        line,
                        field: tag,
                    });
                }
            }
            "elementqty" => {
                if element_count
                    .replace(count(FILE, line, &tag, &value)?)
                    .is_some()
                {
                    return Err(ParseError::Duplicate {
                        file: FILE,
                        line,
                        field: tag,
                    });
                }
            }
            _ => {
                return Err(ParseError::UnknownTag {
                    file: FILE,
                    line,
                    tag,
                });
            }
        }
    }
    let node_count = node_count.ok_or(ParseError::Missing {
        file: FILE,
        field: "nodeqty",
    })?;
    let element_count = element_count.ok_or(ParseError::Missing {
        file: FILE,
        field: "elementqty",
    })?;

    cursor.expect(Tok::LBrace, "'{'")?;
    let mut elements = Vec::with_capacity(element_count);
    while !cursor.eat_rbrace() {
        elements.push(parse_element(&mut cursor, elements.len(), node_count, fluid)?);
    }
    cursor.expect_end()?;

    if elements.len() != element_count {
        return Err(ParseError::CountMismatch {
            file: FILE,
            declared: element_count,
            found: elements.len(),
        });
    }
    Ok(ElementsFile {
        node_count,
        elements,
    })
}

fn parse_element(
    cursor: &mut Cursor,
    position: usize,
    node_count: usize,
    fluid: &'static Fluid,
) -> IoResult<Element> {
    cursor.expect(Tok::LBrace, "'{'")?;

    let mut id: Option<(u32, usize)> = None;
    let mut start: Option<u32> = None;
    let mut end: Option<u32> = None;
    let mut diameter: Option<f64> = None;
    let mut length: Option<f64> = None;
    let mut thickness: Option<f64> = None;
    let mut roughness: Option<f64> = None;
    let mut material: Option<&'static Material> = None;

    while !cursor.eat_rbrace() {
        let (tag, value, line) = cursor.entry()?;
        let duplicate = |field: &str| ParseError::Duplicate {
            file: FILE,
            line,
            field: field.to_string(),
        };
        let node_ref = |field: &str, value: &str| -> IoResult<u32> {
            let n = count(FILE, line, field, value)?;
            if n == 0 || n > node_count {
                return Err(ParseError::Malformed {
                    file: FILE,
                    line,
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
            Ok(n as u32)
        };
        match tag.as_str() {
            "id" => {
                let n = count(FILE, line, &tag, &value)? as u32;
                if id.replace((n, line)).is_some() {
                    return Err(duplicate(&tag));
                }
            }
            "start" => {
                if start.replace(node_ref(&tag, &value)?).is_some() {
                    return Err(duplicate(&tag));
                }
            }
            "end" => {
                if end.replace(node_ref(&tag, &value)?).is_some() {
                    return Err(duplicate(&tag));
                }
            }
            "diameter" => {
                if diameter.replace(number(FILE, line, &tag, &value)?).is_some() {
                    return Err(duplicate(&tag));
                }
            }
            "length" => {
                if length.replace(number(FILE, line, &tag, &value)?).is_some() {
                    return Err(duplicate(&tag));
                }
            }
            "thickness" => {
                if thickness.replace(number(FILE, line, &tag, &value)?).is_some() {
                    return Err(duplicate(&tag));
                }
            }
            "roughness" => {
                if roughness.replace(number(FILE, line, &tag, &value)?).is_some() {
                    return Err(duplicate(&tag));
                }
            }
            "material" => {
                if material.replace(Material::by_name(&value)?).is_some() {
                    return Err(duplicate(&tag));
                }
            }
            _ => {
                return Err(ParseError::UnknownTag {
                    file: FILE,
                    line,
                    tag,
                });
            }
        }
    }

    let missing = |field: &'static str| ParseError::Missing { file: FILE, field };
    let (id, id_line) = id.ok_or(missing("id"))?;
    if id as usize != position + 1 {
        return Err(ParseError::ElementOrder {
            file: FILE,
            line: id_line,
        });
    }

    Ok(Element::new(
        Id::from_one_based(id)?,
        Id::from_one_based(start.ok_or(missing("start"))?)?,
        Id::from_one_based(end.ok_or(missing("end"))?)?,
        diameter.ok_or(missing("diameter"))?,
        length.ok_or(missing("length"))?,
        thickness.ok_or(missing("thickness"))?,
        roughness.ok_or(missing("roughness"))?,
        material.ok_or(missing("material"))?,
        fluid,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sn_props::MaterialKind;

    const SAMPLE: &str = "\
nodeQty: 2;
elementQty: 1;
{
    {
        id: 1;
        start: 1;
        end: 2;
        diameter: 0.3;
        length: 1000;
        thickness: 0.01;
        roughness: 5e-5;
        material: steel;
    }
}
";

    #[test]
    fn parses_a_pipe_block() {
        let water = Fluid::by_name("water").unwrap();
        let parsed = parse_elements(SAMPLE, water).unwrap();
        assert_eq!(parsed.node_count, 2);
        assert_eq!(parsed.elements.len(), 1);
        let e = &parsed.elements[0];
        assert_eq!(e.id.one_based(), 1);
        assert_eq!(e.start.one_based(), 1);
        assert_eq!(e.end.one_based(), 2);
        assert_eq!(e.material.kind, MaterialKind::Steel);
        assert!(e.celerity > 1000.0);
    }

    #[test]
    fn out_of_order_id_is_fatal() {
        let text = SAMPLE.replace("id: 1;", "id: 2;");
        let water = Fluid::by_name("water").unwrap();
        assert!(matches!(
            parse_elements(&text, water).unwrap_err(),
            ParseError::ElementOrder { .. }
        ));
    }

    #[test]
    fn dangling_node_reference_is_fatal() {
        let text = SAMPLE.replace("end: 2;", "end: 7;");
        let water = Fluid::by_name("water").unwrap();
        assert!(matches!(
            parse_elements(&text, water).unwrap_err(),
            ParseError::Malformed { .. }
        ));
    }

    #[test]
    fn count_mismatch_is_fatal() {
        let text = SAMPLE.replace("elementQty: 1;", "elementQty: 2;");
        let water = Fluid::by_name("water").unwrap();
        assert!(matches!(
            parse_elements(&text, water).unwrap_err(),
            ParseError::CountMismatch { .. }
        ));
    }
}
