use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use parish_roster_app::{PersonDirectory, ReplaceRequest, RosterEntry, RosterService, RosterStore, StaticDirectory};
use parish_roster_core::id::{EventId, MinistryId, PersonId};
use parish_roster_core::{Candidates, Event, Person, PoolRequest, Requester, SlotState};
use serde_json::json;
use time::format_description::well_known::Rfc3339;

use crate::{Command, OutputFormat};

pub fn run<S: RosterStore>(command: Command, service: &RosterService<S, StaticDirectory>) -> Result<()> {
    match command {
        Command::Candidates {
            event,
            requester,
            ministry,
            keep,
            format,
        } => {
            let event = lookup_event(service, &event)?;
            let requester = Requester::from(&lookup_person(service, &requester)?);
            let selection = ministry.as_deref().map(parse_ministry_id).transpose()?;
            let keep = keep.as_deref().map(parse_person_id).transpose()?;

            let request = PoolRequest::new(&event, requester).with_selection(selection);
            match service.offer_candidates(&request, keep)? {
                Candidates::Loading => println!("Candidate pool is still loading"),
                Candidates::Ready(people) => match format {
                    OutputFormat::Table => render_people(&people),
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&people)?),
                },
            }
        }
        Command::Add {
            event,
            volunteers,
            assigner,
        } => {
            let event = lookup_event(service, &event)?;
            let volunteers = parse_person_ids(volunteers)?;
            let assigner = parse_person_id(&assigner)?;
            let rows = service.add_volunteers(&event, &volunteers, assigner)?;
            for row in rows {
                println!(
                    "Booked {} on {} ({})",
                    display_name(service, row.volunteer_id),
                    row.event_id,
                    row.id
                );
            }
        }
        Command::Replace {
            event,
            old,
            new,
            current,
        } => {
            let current_replacement = current.as_deref().map(parse_person_id).transpose()?;
            let request = ReplaceRequest {
                event: parse_event_id(&event)?,
                volunteer: parse_person_id(&old)?,
                replacement: parse_person_id(&new)?,
                already_replaced: current_replacement.is_some(),
                current_replacement,
            };
            let outcome = service.replace_volunteer(request)?;
            if outcome.touched() == 0 {
                println!(
                    "No slot held by {} on {}",
                    display_name(service, request.volunteer),
                    request.event
                );
            } else {
                println!(
                    "{} now covers for {} on {}",
                    display_name(service, request.replacement),
                    display_name(service, request.volunteer),
                    request.event
                );
            }
        }
        Command::Remove { event, person } => {
            let event = parse_event_id(&event)?;
            let person = parse_person_id(&person)?;
            let outcome = service.remove_volunteer(event, Some(person))?;
            println!(
                "Removed {} from {}: {} original slot(s), {} replacement(s)",
                display_name(service, person),
                event,
                outcome.originals,
                outcome.replacements
            );
        }
        Command::Roster { event, format } => {
            let event = parse_event_id(&event)?;
            let roster = service.roster(event)?;
            match format {
                OutputFormat::Table => render_roster(&roster)?,
                OutputFormat::Json => {
                    let value = roster
                        .iter()
                        .map(roster_json)
                        .collect::<Result<Vec<_>>>()?;
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
            }
        }
    }

    Ok(())
}

fn lookup_event<S>(service: &RosterService<S, StaticDirectory>, raw: &str) -> Result<Event> {
    let id = parse_event_id(raw)?;
    service
        .directory()
        .event(id)
        .cloned()
        .ok_or_else(|| anyhow!("Unknown event: {id}"))
}

fn lookup_person<S>(service: &RosterService<S, StaticDirectory>, raw: &str) -> Result<Person> {
    let id = parse_person_id(raw)?;
    let Ok(person) = service.directory().person(id);
    person.ok_or_else(|| anyhow!("Unknown person: {id}"))
}

fn display_name<S>(service: &RosterService<S, StaticDirectory>, id: PersonId) -> String {
    let Ok(person) = service.directory().person(id);
    person.as_ref().map_or_else(|| id.to_string(), Person::display_name)
}

fn render_people(people: &[Person]) {
    println!("ID | Name | Role");
    println!("-- | ---- | ----");
    for person in people {
        println!("{} | {} | {}", person.id, person.display_name(), person.role.as_str());
    }
}

fn name_or_dash(person: Option<&Person>) -> String {
    person.map_or_else(|| "-".to_owned(), Person::display_name)
}

fn render_roster(roster: &[RosterEntry]) -> Result<()> {
    println!("ID | Volunteer | Serving | State | Assigned by | Assigned at");
    println!("-- | --------- | ------- | ----- | ----------- | -----------");
    for entry in roster {
        let state = match entry.state() {
            SlotState::Active => "active",
            SlotState::Replaced { .. } => "replaced",
        };
        println!(
            "{} | {} | {} | {} | {} | {}",
            entry.assignment.id,
            name_or_dash(entry.volunteer.as_ref()),
            name_or_dash(entry.holder.as_ref()),
            state,
            name_or_dash(entry.assigner.as_ref()),
            entry.assignment.assigned_at.format(&Rfc3339)?
        );
    }
    Ok(())
}

fn roster_json(entry: &RosterEntry) -> Result<serde_json::Value> {
    Ok(json!({
        "assignment": serde_json::to_value(&entry.assignment)?,
        "volunteer": entry.volunteer,
        "holder": entry.holder,
        "assigner": entry.assigner,
    }))
}

fn parse_person_ids(inputs: Vec<String>) -> Result<Vec<PersonId>> {
    inputs.into_iter().map(|raw| parse_person_id(&raw)).collect()
}

fn parse_person_id(raw: &str) -> Result<PersonId> {
    PersonId::from_str(raw).with_context(|| format!("Invalid person id: {raw}"))
}

fn parse_event_id(raw: &str) -> Result<EventId> {
    EventId::from_str(raw).with_context(|| format!("Invalid event id: {raw}"))
}

fn parse_ministry_id(raw: &str) -> Result<MinistryId> {
    MinistryId::from_str(raw).with_context(|| format!("Invalid ministry id: {raw}"))
}
