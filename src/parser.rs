//! Inline matrix literals for the command line
//!
//! Rows are separated by `;`, values by `,` or whitespace: `"1,2;3,4"`.

use anyhow::{bail, Context, Result};
use cvbind_core::{Depth, HostArray};
use ndarray::{Array2, ArrayD};

/// Parse a literal into a 2-D array of `depth`.
///
/// Integer depths only accept integral values inside the type's range.
pub fn parse_matrix(text: &str, depth: Depth) -> Result<HostArray> {
    let rows: Vec<Vec<f64>> = text
        .split(';')
        .map(str::trim)
        .filter(|row| !row.is_empty())
        .enumerate()
        .map(|(row_num, row)| {
            row.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|value| !value.is_empty())
                .map(|value| {
                    value.parse::<f64>().with_context(|| {
                        format!("Invalid value at row {}: '{}'", row_num + 1, value)
                    })
                })
                .collect::<Result<Vec<f64>>>()
        })
        .collect::<Result<_>>()?;

    let Some(first) = rows.first() else {
        bail!("Matrix literal '{}' has no rows", text);
    };
    let cols = first.len();
    if let Some((row_num, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != cols) {
        bail!(
            "Row {} has {} values, expected {} like the first row",
            row_num + 1,
            row.len(),
            cols
        );
    }

    let values: Vec<f64> = rows.iter().flatten().copied().collect();
    let array = Array2::from_shape_vec((rows.len(), cols), values)?.into_dyn();
    cast(array, depth)
}

fn cast(array: ArrayD<f64>, depth: Depth) -> Result<HostArray> {
    fn integral<T: TryFrom<i64>>(array: &ArrayD<f64>, depth: Depth) -> Result<ArrayD<T>> {
        let values = array
            .iter()
            .map(|&v| {
                if v.fract() != 0.0 {
                    bail!("{} is not an integer, cannot store it as {}", v, depth);
                }
                T::try_from(v as i64)
                    .map_err(|_| anyhow::anyhow!("{} does not fit in {}", v, depth))
            })
            .collect::<Result<Vec<T>>>()?;
        Ok(ArrayD::from_shape_vec(array.raw_dim(), values)?)
    }

    Ok(match depth {
        Depth::U8 => integral::<u8>(&array, depth)?.into(),
        Depth::I8 => integral::<i8>(&array, depth)?.into(),
        Depth::U16 => integral::<u16>(&array, depth)?.into(),
        Depth::I16 => integral::<i16>(&array, depth)?.into(),
        Depth::I32 => integral::<i32>(&array, depth)?.into(),
        Depth::F32 => array.mapv(|v| v as f32).into(),
        Depth::F64 => array.into(),
    })
}

/// Render a host array the way numpy prints small matrices
pub fn format_matrix(array: &HostArray) -> String {
    let values = array.to_f64();
    match values.ndim() {
        2 => {
            let rows: Vec<String> = values
                .outer_iter()
                .map(|row| {
                    let cells: Vec<String> = row.iter().map(|v| format!("{v}")).collect();
                    format!("[{}]", cells.join(", "))
                })
                .collect();
            format!("[{}]", rows.join(",\n "))
        }
        _ => format!("<{} array of shape {:?}>", array.depth(), array.dims()),
    }
}
