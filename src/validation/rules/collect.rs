//! Shared statically-collected grouped field set, used by the Operations
//! rule (subscription single-root-field check) and the Fields rule (field
//! merging). This is the same algorithm the executor runs at request time
//! (spec §4.6 "Collect fields"), minus the runtime concrete-type filter --
//! validation doesn't know which object type a selection will apply to, so
//! every reachable fragment and inline fragment is always followed.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::ast::{fragment_by_name, Document, Field, Selection};

pub fn grouped_fields<'a>(set: &'a [Selection], doc: &'a Document) -> IndexMap<&'a str, Vec<&'a Field>> {
    let mut out = IndexMap::new();
    let mut visited = HashSet::new();
    collect_into(set, doc, &mut visited, &mut out);
    out
}

fn collect_into<'a>(
    set: &'a [Selection],
    doc: &'a Document,
    visited: &mut HashSet<&'a str>,
    out: &mut IndexMap<&'a str, Vec<&'a Field>>,
) {
    for selection in set {
        match selection {
            Selection::Field(field) => {
                out.entry(field.item.response_key()).or_default().push(&field.item);
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.item.name.item.as_str();
                if visited.insert(name) {
                    if let Some(frag) = fragment_by_name(doc, name) {
                        collect_into(&frag.selection_set, doc, visited, out);
                    }
                }
            }
            Selection::InlineFragment(frag) => {
                collect_into(&frag.item.selection_set, doc, visited, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{spanned, FragmentSpread};

    fn field(name: &str) -> Selection {
        Selection::Field(spanned(Field {
            alias: None,
            name: spanned(name.into()),
            arguments: None,
            directives: None,
            selection_set: None,
        }))
    }

    #[test]
    fn fields_from_a_spread_fragment_are_grouped_alongside_direct_fields() {
        let doc: Document = vec![crate::ast::Definition::Fragment(spanned(crate::ast::Fragment {
            name: spanned("F".into()),
            type_condition: spanned("Query".into()),
            directives: None,
            selection_set: vec![field("b")],
        }))];
        let set = vec![
            field("a"),
            Selection::FragmentSpread(spanned(FragmentSpread {
                name: spanned("F".into()),
                directives: None,
            })),
        ];
        let grouped = grouped_fields(&set, &doc);
        assert_eq!(grouped.keys().collect::<Vec<_>>(), vec![&"a", &"b"]);
    }

    #[test]
    fn a_fragment_spread_more_than_once_is_only_collected_the_first_time() {
        let doc: Document = vec![crate::ast::Definition::Fragment(spanned(crate::ast::Fragment {
            name: spanned("F".into()),
            type_condition: spanned("Query".into()),
            directives: None,
            selection_set: vec![field("b")],
        }))];
        let spread = || {
            Selection::FragmentSpread(spanned(FragmentSpread {
                name: spanned("F".into()),
                directives: None,
            }))
        };
        let set = vec![spread(), spread()];
        let grouped = grouped_fields(&set, &doc);
        assert_eq!(grouped.get("b").map(|v| v.len()), Some(1));
    }
}
