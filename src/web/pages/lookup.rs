// © 2025 GS Timetable Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::errors::error::Error;
use super::lookup_api::{LookupOutcome, get_class_numbers, get_data_summary, get_student_numbers, lookup_schedule};
use crate::timetable::{ScheduleEntry, StudentSchedule, Weekday};
use leptos::prelude::*;
use leptos_router::hooks::use_query;
use leptos_router::params::Params;

#[derive(Clone, Debug, Default, Params, PartialEq)]
struct LookupQuery {
	id: Option<String>,
	class: Option<i32>,
	no: Option<i32>,
	day: Option<String>,
}

#[component]
pub fn StudentLookup() -> impl IntoView {
	let query = use_query::<LookupQuery>();
	let current_query = move || query.read().as_ref().ok().cloned().unwrap_or_default();
	let initial_query = query.get_untracked().unwrap_or_default();

	let summary = Resource::new(|| (), |_| get_data_summary());
	let schedule = Resource::new(current_query, |query| {
		lookup_schedule(query.id, query.class, query.no, query.day)
	});

	view! {
		<main id="lookup_page">
			<h1>"학생 이동 시간표 조회"</h1>
			<p class="lookup_help">"학번 또는 반/번호로 검색하세요. 요일을 고르지 않으면 오늘 요일이 표시됩니다."</p>
			<Transition>
				{
					move || summary.read().as_ref().map(|summary| match summary {
						Ok(summary) if summary.has_data() => view! {
							<p class="lookup_updated">{last_updated_text(summary.last_updated_at.as_deref())}</p>
						}.into_any(),
						Ok(_) => view! {
							<p class="lookup_notice">"관리자가 학생 정보와 시간표를 먼저 등록해야 합니다."</p>
						}.into_any(),
						Err(error) => view! { <Error message=error.to_string() /> }.into_any(),
					})
				}
			</Transition>
			<LookupForms initial=initial_query />
			<Transition fallback=|| view! { <p>"불러오는 중..."</p> }>
				{
					move || schedule.read().as_ref().map(|outcome| match outcome {
						Ok(LookupOutcome::Found(schedule)) => view! { <ScheduleView schedule=schedule.clone() /> }.into_any(),
						Ok(LookupOutcome::NotFound) => view! {
							<p class="lookup_notice">"학생을 찾지 못했습니다. 학번이나 반/번호를 확인해 주세요."</p>
						}.into_any(),
						Ok(LookupOutcome::NoQuery) => ().into_any(),
						Err(error) => view! { <Error message=error.to_string() /> }.into_any(),
					})
				}
			</Transition>
		</main>
	}
}

#[component]
fn LookupForms(initial: LookupQuery) -> impl IntoView {
	let (selected_class, set_selected_class) = signal(initial.class);
	let selected_number = initial.no;

	let classes = Resource::new(|| (), |_| get_class_numbers());
	let numbers = Resource::new(
		move || selected_class.get(),
		|class_no| async move {
			match class_no {
				Some(class_no) => get_student_numbers(class_no).await,
				None => Ok(Vec::new()),
			}
		},
	);

	view! {
		<form id="lookup_by_id" method="get" action="/">
			<label>
				"학번"
				<input type="text" name="id" inputmode="numeric" placeholder="예: 20115" value=initial.id.unwrap_or_default() />
			</label>
			<button type="submit">"학번으로 조회"</button>
		</form>
		<form id="lookup_by_class" method="get" action="/">
			<label>
				"반"
				<select name="class" on:change=move |event| set_selected_class.set(event_target_value(&event).parse().ok())>
					<option value="">"-"</option>
					<Transition>
						{
							move || classes.read().as_ref().and_then(|classes| classes.as_ref().ok()).map(|classes| {
								classes.iter().map(|class_no| {
									let class_no = *class_no;
									view! {
										<option value=class_no.to_string() selected=move || selected_class.get() == Some(class_no)>
											{class_label(Some(class_no))}
										</option>
									}
								}).collect_view()
							})
						}
					</Transition>
				</select>
			</label>
			<label>
				"번호"
				<select name="no">
					<option value="">"-"</option>
					<Transition>
						{
							move || numbers.read().as_ref().and_then(|numbers| numbers.as_ref().ok()).map(|numbers| {
								numbers.iter().map(|student_no| {
									let student_no = *student_no;
									view! {
										<option value=student_no.to_string() selected=selected_number == Some(student_no)>
											{number_label(Some(student_no))}
										</option>
									}
								}).collect_view()
							})
						}
					</Transition>
				</select>
			</label>
			<button type="submit">"반/번호로 조회"</button>
		</form>
	}
}

#[component]
fn ScheduleView(schedule: StudentSchedule) -> impl IntoView {
	let StudentSchedule { student, weekday, entries } = schedule;
	let homeroom = student.homeroom_location.clone().unwrap_or_else(|| String::from("-"));

	let day_links = Weekday::ALL
		.into_iter()
		.map(|day| {
			let link_class = if day == weekday { "weekday_link selected" } else { "weekday_link" };
			view! {
				<a class=link_class href=day_href(&student.student_id, day)>
					{day.label()}
				</a>
			}
		})
		.collect_view();

	let rows = if entries.is_empty() {
		view! {
			<tr>
				<td colspan="5">"시간표 없음"</td>
			</tr>
		}
		.into_any()
	} else {
		entries
			.into_iter()
			.map(|entry| view! { <ScheduleRow entry /> })
			.collect_view()
			.into_any()
	};

	view! {
		<section id="student_schedule">
			<div class="student_summary">
				<span class="student_name">{student.student_name.clone()}</span>
				<span class="student_id">{student.student_id.clone()}</span>
				<span class="student_class">
					{format!("{} {}", class_label(student.class_no), number_label(student.student_no))}
				</span>
				<span class="student_homeroom">{format!("본반 교실: {}", homeroom)}</span>
			</div>
			<nav class="weekday_links">{day_links}</nav>
			<h2>{format!("{}요일 시간표", weekday.label())}</h2>
			<table class="schedule_table">
				<thead>
					<tr>
						<th>"교시"</th>
						<th>"과목명(교사)"</th>
						<th>"수업블록"</th>
						<th>"기준반"</th>
						<th>"이동할 장소"</th>
					</tr>
				</thead>
				<tbody>{rows}</tbody>
			</table>
		</section>
	}
}

#[component]
fn ScheduleRow(entry: ScheduleEntry) -> impl IntoView {
	view! {
		<tr>
			<td>{period_label(entry.period)}</td>
			<td>{entry.subject_teacher}</td>
			<td>{entry.block_code.unwrap_or_else(|| String::from("-"))}</td>
			<td>{class_label(Some(entry.basis_class_no))}</td>
			<td class="destination">{entry.destination}</td>
		</tr>
	}
}

fn class_label(class_no: Option<i32>) -> String {
	match class_no {
		Some(class_no) => format!("{}반", class_no),
		None => String::from("-"),
	}
}

fn number_label(student_no: Option<i32>) -> String {
	match student_no {
		Some(student_no) => format!("{}번", student_no),
		None => String::from("-"),
	}
}

fn period_label(period: i32) -> String {
	format!("{}교시", period)
}

fn day_href(student_id: &str, day: Weekday) -> String {
	format!("/?id={}&day={}", student_id, day.code())
}

fn last_updated_text(last_updated_at: Option<&str>) -> String {
	match last_updated_at {
		Some(last_updated_at) => format!("최근 업데이트: {}", last_updated_at),
		None => String::from("최근 업데이트: -"),
	}
}
