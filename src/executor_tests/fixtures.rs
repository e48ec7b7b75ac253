use std::{any::Any, sync::Arc};

use crate::{
    ast::Type,
    executor::{FieldError, Resolved, ResolverContext},
    schema::{
        Argument, EnumMeta, EnumValue, Field, InterfaceMeta, ObjectMeta, Schema, UnionMeta,
    },
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Episode {
    NewHope,
    Empire,
    Jedi,
}

impl Episode {
    fn name(self) -> &'static str {
        match self {
            Self::NewHope => "NEW_HOPE",
            Self::Empire => "EMPIRE",
            Self::Jedi => "JEDI",
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Human {
    pub(crate) id: &'static str,
    pub(crate) name: &'static str,
    pub(crate) home_planet: Option<&'static str>,
    pub(crate) friend_ids: &'static [&'static str],
    pub(crate) appears_in: &'static [Episode],
}

#[derive(Clone, Debug)]
pub(crate) struct Droid {
    pub(crate) id: &'static str,
    pub(crate) name: &'static str,
    pub(crate) primary_function: Option<&'static str>,
    pub(crate) friend_ids: &'static [&'static str],
    pub(crate) appears_in: &'static [Episode],
}

const ALL_EPISODES: &[Episode] = &[Episode::NewHope, Episode::Empire, Episode::Jedi];

static HUMANS: &[Human] = &[
    Human {
        id: "1000",
        name: "Luke Skywalker",
        home_planet: Some("Tatooine"),
        friend_ids: &["1002", "1003", "2000", "2001"],
        appears_in: ALL_EPISODES,
    },
    Human {
        id: "1001",
        name: "Darth Vader",
        home_planet: Some("Tatooine"),
        friend_ids: &["1004"],
        appears_in: ALL_EPISODES,
    },
    Human {
        id: "1002",
        name: "Han Solo",
        home_planet: None,
        friend_ids: &["1000", "1003", "2001"],
        appears_in: ALL_EPISODES,
    },
    Human {
        id: "1003",
        name: "Leia Organa",
        home_planet: Some("Alderaan"),
        friend_ids: &["1000", "1002", "2000", "2001"],
        appears_in: ALL_EPISODES,
    },
    Human {
        id: "1004",
        name: "Wilhuff Tarkin",
        home_planet: None,
        friend_ids: &["1001"],
        appears_in: &[Episode::NewHope],
    },
];

static DROIDS: &[Droid] = &[
    Droid {
        id: "2000",
        name: "C-3PO",
        primary_function: Some("Protocol"),
        friend_ids: &["1000", "1002", "1003", "2001"],
        appears_in: ALL_EPISODES,
    },
    Droid {
        id: "2001",
        name: "R2-D2",
        primary_function: Some("Astromech"),
        friend_ids: &["1000", "1002", "1003"],
        appears_in: ALL_EPISODES,
    },
];

/// In-memory character store, reachable from the root value.
#[derive(Debug, Default)]
pub(crate) struct Database;

impl Database {
    pub(crate) fn human(&self, id: &str) -> Option<&'static Human> {
        HUMANS.iter().find(|h| h.id == id)
    }

    pub(crate) fn droid(&self, id: &str) -> Option<&'static Droid> {
        DROIDS.iter().find(|d| d.id == id)
    }

    /// A character as an abstract value, tagged with its runtime type.
    pub(crate) fn character(&self, id: &str) -> Resolved {
        if let Some(h) = self.human(id) {
            Resolved::typed_object("Human", h.clone())
        } else if let Some(d) = self.droid(id) {
            Resolved::typed_object("Droid", d.clone())
        } else {
            Resolved::null()
        }
    }

    fn search(&self, text: &str) -> Vec<Resolved> {
        let humans = HUMANS
            .iter()
            .filter(|h| h.name.contains(text))
            .map(|h| Resolved::typed_object("Human", h.clone()));
        let droids = DROIDS
            .iter()
            .filter(|d| d.name.contains(text))
            .map(|d| Resolved::typed_object("Droid", d.clone()));
        humans.chain(droids).collect()
    }
}

/// Native representation of the `Query` type.
#[derive(Debug, Default)]
pub(crate) struct QueryRoot {
    pub(crate) database: Database,
}

/// A field resolved synchronously from its parent value.
pub(crate) fn getter<T, F>(name: &str, field_type: Type, get: F) -> Field
where
    T: Any,
    F: Fn(&T) -> Resolved + Send + Sync + 'static,
{
    Field::new(name, field_type).resolve_with(move |ctx: ResolverContext| {
        let resolved = ctx.parent::<T>().map(&get).ok_or_else(|| {
            FieldError::from(format!(
                "Parent of `{}` is not a `{}`",
                ctx.path(),
                std::any::type_name::<T>(),
            ))
        });
        async move { resolved }
    })
}

fn episodes(appears_in: &[Episode]) -> Resolved {
    Resolved::list(appears_in.iter().map(|e| Resolved::value(e.name())))
}

fn friends(friend_ids: &[&str]) -> Resolved {
    Resolved::list(friend_ids.iter().map(|id| Database.character(id)))
}

fn string_arg(ctx: &ResolverContext, name: &str) -> Option<String> {
    ctx.argument(name)
        .and_then(|v| v.as_string_value().or_else(|| v.as_enum_value()))
        .map(Into::into)
}

fn query_field(
    name: &str,
    field_type: Type,
    resolve: fn(&Database, &ResolverContext) -> Resolved,
) -> Field {
    Field::new(name, field_type).resolve_with(move |ctx: ResolverContext| {
        let resolved = ctx
            .parent::<QueryRoot>()
            .map(|root| resolve(&root.database, &ctx))
            .ok_or_else(|| FieldError::from("No root value"));
        async move { resolved }
    })
}

fn character_fields() -> Vec<Field> {
    vec![
        Field::new("id", Type::non_null_named("String")),
        Field::new("name", Type::named("String")),
        Field::new("friends", Type::list(Type::named("Character"))),
        Field::new("appearsIn", Type::non_null_list(Type::named("Episode"))),
    ]
}

/// The Star Wars schema, with `Query` bound to [`QueryRoot`].
pub(crate) fn starwars_schema() -> Schema {
    Schema::builder()
        .register(EnumMeta::new(
            "Episode",
            vec![
                EnumValue::new("NEW_HOPE"),
                EnumValue::new("EMPIRE"),
                EnumValue::new("JEDI"),
            ],
        ))
        .register(
            InterfaceMeta::new("Character", character_fields())
                .description("A character in the Star Wars Trilogy"),
        )
        .register(
            ObjectMeta::new(
                "Human",
                vec![
                    getter("id", Type::non_null_named("String"), |h: &Human| {
                        Resolved::value(h.id)
                    }),
                    getter("name", Type::named("String"), |h: &Human| {
                        Resolved::value(h.name)
                    }),
                    getter("homePlanet", Type::named("String"), |h: &Human| {
                        Resolved::value(h.home_planet)
                    }),
                    getter(
                        "friends",
                        Type::list(Type::named("Character")),
                        |h: &Human| friends(h.friend_ids),
                    ),
                    getter(
                        "appearsIn",
                        Type::non_null_list(Type::named("Episode")),
                        |h: &Human| episodes(h.appears_in),
                    ),
                ],
            )
            .interfaces(&["Character"]),
        )
        .register(
            ObjectMeta::new(
                "Droid",
                vec![
                    getter("id", Type::non_null_named("String"), |d: &Droid| {
                        Resolved::value(d.id)
                    }),
                    getter("name", Type::named("String"), |d: &Droid| {
                        Resolved::value(d.name)
                    }),
                    getter("primaryFunction", Type::named("String"), |d: &Droid| {
                        Resolved::value(d.primary_function)
                    }),
                    getter(
                        "friends",
                        Type::list(Type::named("Character")),
                        |d: &Droid| friends(d.friend_ids),
                    ),
                    getter(
                        "appearsIn",
                        Type::non_null_list(Type::named("Episode")),
                        |d: &Droid| episodes(d.appears_in),
                    ),
                ],
            )
            .interfaces(&["Character"]),
        )
        .register(UnionMeta::new("SearchResult", &["Human", "Droid"]))
        .register(ObjectMeta::new(
            "Query",
            vec![
                query_field("hero", Type::named("Character"), |db, ctx| {
                    match string_arg(ctx, "episode").as_deref() {
                        Some("EMPIRE") => db.character("1000"),
                        _ => db.character("2001"),
                    }
                })
                .argument(Argument::new("episode", Type::named("Episode"))),
                query_field("human", Type::named("Human"), |db, ctx| {
                    let human = string_arg(ctx, "id").and_then(|id| db.human(&id));
                    Resolved::from(human.map(|h| Resolved::object(h.clone())))
                })
                .argument(Argument::new("id", Type::non_null_named("String"))),
                query_field("droid", Type::named("Droid"), |db, ctx| {
                    let droid = string_arg(ctx, "id").and_then(|id| db.droid(&id));
                    Resolved::from(droid.map(|d| Resolved::object(d.clone())))
                })
                .argument(Argument::new("id", Type::non_null_named("String"))),
                query_field(
                    "search",
                    Type::non_null_list(Type::non_null_named("SearchResult")),
                    |db, ctx| {
                        let text = string_arg(ctx, "text").unwrap_or_default();
                        Resolved::List(db.search(&text))
                    },
                )
                .argument(Argument::new("text", Type::named("String")).default_value("")),
            ],
        ))
        .query_type("Query")
        .bind_native::<QueryRoot, _>("Query", |_| QueryRoot::default())
        .build()
        .expect("Star Wars schema is valid")
}

/// A schema whose `Query` fields are given by the caller and has no native
/// root binding.
pub(crate) fn schema_with_query(fields: Vec<Field>) -> Arc<Schema> {
    Arc::new(
        Schema::builder()
            .register(ObjectMeta::new("Query", fields))
            .query_type("Query")
            .build()
            .expect("valid schema"),
    )
}
