//! `settings` file: one outer block of `tag: value;` entries.

use crate::lexer::{Cursor, Tok, count, number};
use crate::{IoResult, ParseError};
use sn_network::Settings;
use sn_props::Fluid;

const FILE: &str = "settings";

pub fn parse_settings(text: &str) -> IoResult<Settings> {
    let mut cursor = Cursor::new(FILE, text)?;
    cursor.expect(Tok::LBrace, "'{'")?;

    let mut fluid: Option<&'static Fluid> = None;
    let mut gas_fraction: Option<f64> = None;
    let mut discretization: Option<usize> = None;
    let mut sym_time: Option<f64> = None;
    let mut write_interval: Option<usize> = None;
    let mut weighting_factor: Option<f64> = None;

    while !cursor.eat_rbrace() {
        let (tag, value, line) = cursor.entry()?;
        let duplicate = |field: &str| ParseError::Duplicate {
            file: FILE,
            line,
            field: field.to_string(),
        };
        match tag.as_str() {
            "fluid" => {
                if fluid.replace(Fluid::by_name(&value)?).is_some() {
                    return Err(duplicate(&tag));
                }
            }
            "gasfraction" => {
                if gas_fraction.replace(number(FILE, line, &tag, &value)?).is_some() {
                    return Err(duplicate(&tag));
                }
            }
            "discretization" => {
                if discretization.replace(count(FILE, line, &tag, &value)?).is_some() {
                    return Err(duplicate(&tag));
                }
            }
            "symtime" => {
                if sym_time.replace(number(FILE, line, &tag, &value)?).is_some() {
                    return Err(duplicate(&tag));
                }
            }
            "writeinterval" => {
                if write_interval.replace(count(FILE, line, &tag, &value)?).is_some() {
                    return Err(duplicate(&tag));
                }
            }
            "weightingfactor" => {
                if weighting_factor
                    .replace(number(FILE, line, &tag, &value)?)
                    .is_some()
                {
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
    cursor.expect_end()?;

    let settings = Settings::new(
        fluid.ok_or(ParseError::Missing {
            file: FILE,
            field: "fluid",
        })?,
        gas_fraction.unwrap_or(0.0),
        discretization.ok_or(ParseError::Missing {
            file: FILE,
            field: "discretization",
        })?,
        sym_time.ok_or(ParseError::Missing {
            file: FILE,
            field: "symtime",
        })?,
        write_interval.unwrap_or(1),
        weighting_factor.unwrap_or(1.0),
    )?;
    Ok(settings)
}
