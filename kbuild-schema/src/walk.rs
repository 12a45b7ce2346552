//! Recursive traversal of schema options.

use crate::{Result, Schema, SchemaNode};

/// A settable option found by [`walk`].
#[derive(Debug, Clone)]
pub struct Leaf<'a> {
    /// Property path from the root, including the leaf name.
    pub path: Vec<String>,
    /// The leaf node, with any `$ref` already resolved.
    pub node: SchemaNode<'a>,
}

impl Leaf<'_> {
    /// Option name joined with `sep` (e.g. `repo-git` or `repo_git`).
    pub fn joined(&self, sep: &str) -> String {
        self.path.join(sep)
    }
}

/// Visit every leaf property below `node`.
///
/// `visit` receives the property name, the leaf node and the path of the
/// enclosing containers. References are resolved against `schema` before
/// the target is classified. Properties with neither a `type` nor a
/// `$ref` are skipped.
pub fn walk<'a, F>(
    schema: &'a Schema,
    node: SchemaNode<'a>,
    visit: &mut F,
    prefix: &[String],
) -> Result<()>
where
    F: FnMut(&str, SchemaNode<'a>, &[String]) -> Result<()>,
{
    let Some(properties) = node.properties() else {
        return Ok(());
    };

    for (name, value) in properties {
        let child = SchemaNode::new(value);
        if child.reference().is_some() {
            let target = schema.resolve(child)?;
            if target.is_leaf() {
                visit(name, target, prefix)?;
            } else {
                walk(schema, target, visit, &extend(prefix, name))?;
            }
        } else if child.is_container() {
            walk(schema, child, visit, &extend(prefix, name))?;
        } else if child.is_leaf() {
            visit(name, child, prefix)?;
        }
    }

    Ok(())
}

/// Collect every leaf option of the schema in declaration order.
pub fn leaves(schema: &Schema) -> Result<Vec<Leaf<'_>>> {
    let mut found = Vec::new();
    walk(
        schema,
        schema.root(),
        &mut |name, node, prefix| {
            found.push(Leaf {
                path: extend(prefix, name),
                node,
            });
            Ok(())
        },
        &[],
    )?;
    Ok(found)
}

fn extend(prefix: &[String], name: &str) -> Vec<String> {
    let mut path = prefix.to_vec();
    path.push(name.to_string());
    path
}
